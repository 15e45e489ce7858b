use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Role of a user. Stored as lowercase text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Second-factor kind. Only `email` is wired into a flow; `totp` exists
/// in the data model but no endpoint uses it yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MfaType {
    Email,
    Totp,
}

/// User record in the database.
///
/// Secret-bearing columns never serialize; JSON responses go through
/// [`super::dto::PublicUser`] anyway.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_blocked: bool,
    pub avatar: Option<String>,
    pub mfa_enabled: bool,
    pub mfa_type: Option<MfaType>,
    #[serde(skip_serializing)]
    pub otp_hash: Option<String>,
    pub otp_expires_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    pub reset_expires_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub totp_secret: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$stub".into(),
            role: Role::User,
            is_blocked: false,
            avatar: None,
            mfa_enabled: false,
            mfa_type: None,
            otp_hash: Some("deadbeef".into()),
            otp_expires_at: None,
            reset_token_hash: Some("cafebabe".into()),
            reset_expires_at: None,
            totp_secret: Some("JBSWY3DP".into()),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn secret_fields_never_serialize() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2id$stub"));
        assert!(!json.contains("deadbeef"));
        assert!(!json.contains("cafebabe"));
        assert!(!json.contains("JBSWY3DP"));
        assert!(json.contains("a@x.com"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
