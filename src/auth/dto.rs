use serde::{Deserialize, Serialize};

use crate::users::dto::PublicUser;

/// Request body for user registration. A caller-supplied `role` is accepted
/// for wire compatibility but never honored; see the register handler.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

/// Response for register, login, verify-otp and google sign-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

/// Login answered with a second-factor challenge instead of a token.
/// The raw OTP rides along as a development stand-in for email delivery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaChallengeResponse {
    pub success: bool,
    pub mfa_required: bool,
    pub mfa_type: &'static str,
    pub message: String,
    pub otp: String,
}

/// Reset token echoed to the caller, a development stand-in for email
/// delivery (outbound mail is an external collaborator).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub success: bool,
    pub message: String,
    pub reset_token: String,
    pub reset_url: String,
    pub note: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mfa_challenge_uses_camel_case_keys() {
        let challenge = MfaChallengeResponse {
            success: true,
            mfa_required: true,
            mfa_type: "email",
            message: "OTP sent to registered email".into(),
            otp: "123456".into(),
        };
        let json = serde_json::to_string(&challenge).unwrap();
        assert!(json.contains("\"mfaRequired\":true"));
        assert!(json.contains("\"mfaType\":\"email\""));
    }

    #[test]
    fn register_request_tolerates_missing_role() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"secret1"}"#,
        )
        .unwrap();
        assert!(req.role.is_none());
    }
}
