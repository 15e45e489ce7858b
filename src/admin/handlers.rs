use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AdminUser,
    error::{ApiError, ApiResult},
    state::AppState,
    users::{
        dto::PublicUser,
        repo_types::{Role, User},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/block/:id", put(block_user))
        .route("/promote/:id", put(promote_user))
        .route("/delete/:id", delete(delete_user))
}

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct UserActionResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    pub success: bool,
    pub message: String,
    pub deleted_user: PublicUser,
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<UsersListResponse>> {
    let users = User::list_all(&state.db).await?;
    let users: Vec<PublicUser> = users.iter().map(PublicUser::from).collect();
    Ok(Json(UsersListResponse {
        success: true,
        count: users.len(),
        users,
    }))
}

#[instrument(skip(state, admin))]
pub async fn block_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserActionResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if user.id == admin.id {
        return Err(ApiError::Validation("You cannot block yourself".into()));
    }

    let updated = User::set_blocked(&state.db, id, !user.is_blocked).await?;
    let verb = if updated.is_blocked { "blocked" } else { "unblocked" };
    info!(admin_id = %admin.id, user_id = %updated.id, action = verb, "block toggled");
    Ok(Json(UserActionResponse {
        success: true,
        message: format!("User {verb} successfully"),
        user: PublicUser::from(&updated),
    }))
}

#[instrument(skip(state, admin))]
pub async fn promote_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserActionResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if user.role == Role::Admin {
        return Err(ApiError::Validation("User is already an admin".into()));
    }

    let updated = User::set_role(&state.db, id, Role::Admin).await?;
    info!(admin_id = %admin.id, user_id = %updated.id, "user promoted to admin");
    Ok(Json(UserActionResponse {
        success: true,
        message: "User promoted to admin successfully".into(),
        user: PublicUser::from(&updated),
    }))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if user.id == admin.id {
        return Err(ApiError::Validation("You cannot delete yourself".into()));
    }

    User::delete(&state.db, id).await?;
    info!(admin_id = %admin.id, user_id = %user.id, "user deleted");
    Ok(Json(DeleteUserResponse {
        success: true,
        message: "User deleted successfully".into(),
        deleted_user: PublicUser::from(&user),
    }))
}
