use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::AuthUser,
        handlers::normalize_email,
        password::{hash_password, verify_password},
    },
    error::{ApiError, ApiResult},
    state::AppState,
    users::{
        dto::{ChangePasswordRequest, PublicUser, UpdateProfileRequest, UserResponse},
        repo_types::User,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/update", put(update_profile))
        .route("/change-password", put(change_password))
        .route("/upload-avatar", post(upload_avatar))
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024)) // 5MB avatars
}

#[instrument(skip_all)]
pub async fn me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

#[instrument(skip(state, user, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    // Both fields overwritten as given; no format re-validation on this
    // path, but the email is normalized like on every other write so
    // exact-match login lookups keep working and the unique index holds.
    let (name, email) = sanitize_profile(&payload);
    let updated = User::update_profile(&state.db, user.id, &name, &email).await?;
    info!(user_id = %updated.id, "profile updated");
    Ok(Json(UserResponse {
        success: true,
        user: PublicUser::from(&updated),
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if !verify_password(&payload.old_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change-password with wrong old password");
        return Err(ApiError::Validation("Old password incorrect".into()));
    }
    if payload.new_password.chars().count() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let hash = hash_password(&payload.new_password)?;
    User::set_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password updated",
    })))
}

#[instrument(skip(state, user, multipart))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UserResponse>> {
    let mut upload: Option<(String, bytes::Bytes)> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("invalid upload: {e}")))?;
            upload = Some((content_type, data));
            break;
        }
    }

    let Some((content_type, data)) = upload else {
        return Err(ApiError::Validation("No file uploaded".into()));
    };
    if data.is_empty() {
        return Err(ApiError::Validation("No file uploaded".into()));
    }

    let ext = ext_from_mime(&content_type).unwrap_or("bin");
    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    state.avatars.save(&filename, data).await?;

    let updated = User::set_avatar(&state.db, user.id, &format!("/uploads/{filename}")).await?;
    info!(user_id = %updated.id, file = %filename, "avatar uploaded");
    Ok(Json(UserResponse {
        success: true,
        user: PublicUser::from(&updated),
    }))
}

fn sanitize_profile(payload: &UpdateProfileRequest) -> (String, String) {
    (
        payload.name.trim().to_string(),
        normalize_email(&payload.email),
    )
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_update_normalizes_email() {
        // A mixed-case update must not strand the account: login lookups
        // are exact-match on the normalized form.
        let payload = UpdateProfileRequest {
            name: " New Name ".into(),
            email: "A@X.CoM ".into(),
        };
        let (name, email) = sanitize_profile(&payload);
        assert_eq!(name, "New Name");
        assert_eq!(email, "a@x.com");
    }

    #[test]
    fn ext_from_mime_mapping() {
        assert_eq!(super::ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(super::ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(super::ext_from_mime("image/png"), Some("png"));
        assert_eq!(super::ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(super::ext_from_mime("image/gif"), Some("gif"));
        assert_eq!(super::ext_from_mime("application/pdf"), None);
    }
}
