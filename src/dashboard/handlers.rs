use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use time::format_description::well_known::Rfc3339;
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::dto::{success_rate, ActivityItem, AddActivityRequest, StatsResponse};
use super::repo::Activity;

const FEED_LIMIT: i64 = 5;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/activity", get(activity_feed))
        .route("/add", post(add_activity))
}

#[instrument(skip(state, user))]
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<StatsResponse>> {
    let total = Activity::count_for_user(&state.db, user.id).await?;
    let completed = Activity::count_completed_for_user(&state.db, user.id).await?;

    Ok(Json(StatsResponse {
        total_activities: total,
        // Placeholder metric carried over from the dashboard design.
        active_time: format!("{total}h"),
        completed,
        success_rate: success_rate(completed, total),
    }))
}

#[instrument(skip(state, user))]
pub async fn activity_feed(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<ActivityItem>>> {
    let activities = Activity::recent_for_user(&state.db, user.id, FEED_LIMIT).await?;
    let items = activities
        .into_iter()
        .map(|a| ActivityItem {
            id: a.id,
            title: a.title,
            desc: a.description,
            time: a.created_at.format(&Rfc3339).unwrap_or_default(),
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, user, payload))]
pub async fn add_activity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<AddActivityRequest>,
) -> ApiResult<Json<Activity>> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Please provide a title".into()));
    }

    let activity = Activity::create(&state.db, user.id, title, payload.desc.trim()).await?;
    info!(user_id = %user.id, activity_id = %activity.id, "activity created");
    Ok(Json(activity))
}
