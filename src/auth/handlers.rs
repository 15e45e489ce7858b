use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, GoogleLoginRequest,
            LoginRequest, MessageResponse, MfaChallengeResponse, RegisterRequest,
            ResetPasswordRequest, VerifyOtpRequest,
        },
        jwt::JwtKeys,
        otp,
        password::{hash_password, verify_password},
    },
    error::{ApiError, ApiResult},
    state::AppState,
    users::{
        dto::PublicUser,
        repo_types::{MfaType, Role, User},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-otp", post(verify_otp))
        .route("/google", post(google_login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", post(reset_password))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trim + lowercase. Every path that writes an email goes through this,
/// so the exact-match lookups and the unique index stay consistent.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&payload.email);
    let name = payload.name.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::Validation("Please provide a name".into()));
    }
    if name.chars().count() > 50 {
        return Err(ApiError::Validation(
            "Name cannot be more than 50 characters".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Please provide a valid email".into()));
    }
    if payload.password.chars().count() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    // Self-registration never grants a privileged role, no matter what the
    // caller asked for.
    if let Some(requested) = payload.role.as_deref() {
        if requested != "user" {
            warn!(requested = %requested, email = %email, "ignoring caller-supplied role");
        }
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict(
            "User already exists with this email".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &name, &email, &hash, Role::User).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".into(),
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Response> {
    let email = normalize_email(&payload.email);

    // Check order is fixed: existence, blocked, password.
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            ApiError::Unauthorized("Invalid credentials".into())
        })?;

    if user.is_blocked {
        warn!(user_id = %user.id, "login attempt on blocked account");
        return Err(ApiError::Forbidden(
            "Your account has been blocked. Please contact support.".into(),
        ));
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    if user.mfa_enabled && user.mfa_type == Some(MfaType::Email) {
        let code = otp::generate_otp();
        let expires_at = OffsetDateTime::now_utc() + otp::OTP_TTL;
        User::set_otp_challenge(&state.db, user.id, &otp::sha256_hex(&code), expires_at).await?;

        info!(user_id = %user.id, "email otp challenge issued");
        // The raw code in the response body stands in for email delivery.
        return Ok(Json(MfaChallengeResponse {
            success: true,
            mfa_required: true,
            mfa_type: "email",
            message: "OTP sent to registered email".into(),
            otp: code,
        })
        .into_response());
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: PublicUser::from(&user),
    })
    .into_response())
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = normalize_email(&payload.email);

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired OTP".into()))?;

    if user.is_blocked {
        return Err(ApiError::Forbidden(
            "Your account has been blocked. Please contact support.".into(),
        ));
    }

    let stored = user
        .otp_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired OTP".into()))?;

    let now = OffsetDateTime::now_utc();
    if otp::challenge_expired(user.otp_expires_at, now)
        || otp::sha256_hex(payload.otp.trim()) != stored
    {
        warn!(user_id = %user.id, "otp verification failed");
        return Err(ApiError::Unauthorized("Invalid or expired OTP".into()));
    }

    // Single use: consume the challenge before handing out a token.
    User::clear_otp_challenge(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, "otp verified, session issued");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let id_token = payload
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("Google token is required".into()))?;

    let profile = state.google.verify(id_token).await.map_err(|e| {
        warn!(error = %e, "google id token rejected");
        ApiError::Unauthorized("Google authentication failed".into())
    })?;

    let email = normalize_email(&profile.email);
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            // First federated sign-in: provision a local account whose
            // password can never match a login attempt.
            let sentinel = hash_password(&otp::generate_reset_token())?;
            let mut name = profile.name.trim().to_string();
            if name.chars().count() > 50 {
                name = name.chars().take(50).collect();
            }
            let created = User::create(&state.db, &name, &email, &sentinel, Role::User).await?;
            info!(user_id = %created.id, "user provisioned via google sign-in");
            created
        }
    };

    if user.is_blocked {
        return Err(ApiError::Forbidden(
            "Your account has been blocked. Please contact support.".into(),
        ));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, "user logged in via google");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<ForgotPasswordResponse>> {
    let email = normalize_email(&payload.email);

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user found with this email".into()))?;

    let reset_token = otp::generate_reset_token();
    let expires_at = OffsetDateTime::now_utc() + otp::RESET_TTL;
    User::set_reset_challenge(&state.db, user.id, &otp::sha256_hex(&reset_token), expires_at)
        .await?;

    let reset_url = format!(
        "{}/api/auth/reset-password/{}",
        state.config.public_base_url, reset_token
    );

    info!(user_id = %user.id, "password reset token generated");
    // The raw token in the response body stands in for email delivery.
    Ok(Json(ForgotPasswordResponse {
        success: true,
        message: "Password reset token generated".into(),
        reset_token,
        reset_url,
        note: "In production, this would be sent via email",
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("Please provide a new password".into()))?;
    if password.chars().count() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let now = OffsetDateTime::now_utc();
    let token_hash = otp::sha256_hex(&token);
    let user = User::find_by_reset_hash(&state.db, &token_hash, now)
        .await?
        .ok_or_else(|| ApiError::Validation("Invalid or expired reset token".into()))?;

    let hash = hash_password(password)?;
    // The update re-checks the challenge; a concurrent reset that got there
    // first leaves nothing to consume.
    if !User::reset_password(&state.db, user.id, &hash, &token_hash, now).await? {
        return Err(ApiError::Validation("Invalid or expired reset token".into()));
    }

    info!(user_id = %user.id, "password reset completed");
    Ok(Json(MessageResponse {
        success: true,
        message: "Password reset successful".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  A@X.CoM "), "a@x.com");
    }
}
