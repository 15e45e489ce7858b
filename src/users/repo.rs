use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{Role, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_blocked, avatar, \
     mfa_enabled, mfa_type, otp_hash, otp_expires_at, \
     reset_token_hash, reset_expires_at, totp_secret, created_at, updated_at";

impl User {
    /// Create a user. A unique violation on email bubbles up as a
    /// database error classified by the caller.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await
    }

    /// Find a user by (normalized) email. The password hash comes along;
    /// it is hidden at the JSON boundary, not here.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// All users, newest first.
    pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, email = $3, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_one(db)
        .await
    }

    pub async fn set_password(db: &PgPool, id: Uuid, password_hash: &str) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_blocked(db: &PgPool, id: Uuid, blocked: bool) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_blocked = $2, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(blocked)
        .fetch_one(db)
        .await
    }

    pub async fn set_role(db: &PgPool, id: Uuid, role: Role) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .fetch_one(db)
        .await
    }

    /// Hard delete, no tombstone.
    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_avatar(db: &PgPool, id: Uuid, avatar: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET avatar = $2, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(avatar)
        .fetch_one(db)
        .await
    }

    // --- challenge state ---

    pub async fn set_otp_challenge(
        db: &PgPool,
        id: Uuid,
        otp_hash: &str,
        expires_at: OffsetDateTime,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET otp_hash = $2, otp_expires_at = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(otp_hash)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn clear_otp_challenge(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET otp_hash = NULL, otp_expires_at = NULL, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn set_reset_challenge(
        db: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_expires_at = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Look up the user holding an unexpired reset challenge for this digest.
    pub async fn find_by_reset_hash(
        db: &PgPool,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE reset_token_hash = $1 AND reset_expires_at > $2"
        ))
        .bind(token_hash)
        .bind(now)
        .fetch_optional(db)
        .await
    }

    /// Set the new password and consume the reset challenge in one statement.
    /// The update re-checks the token digest and expiry itself, so of two
    /// concurrent attempts only one can win; returns false when the
    /// challenge was already consumed or has expired.
    pub async fn reset_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(CONSUME_RESET_SQL)
            .bind(id)
            .bind(password_hash)
            .bind(token_hash)
            .bind(now)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const CONSUME_RESET_SQL: &str = "UPDATE users
     SET password_hash = $2, reset_token_hash = NULL, reset_expires_at = NULL,
         updated_at = now()
     WHERE id = $1 AND reset_token_hash = $3 AND reset_expires_at > $4";

#[cfg(test)]
mod tests {
    use super::CONSUME_RESET_SQL;

    #[test]
    fn reset_consume_is_self_conditioned() {
        // The single-use guarantee lives in this statement: it must match
        // the stored digest and an unexpired window, not just the id.
        assert!(CONSUME_RESET_SQL.contains("reset_token_hash = $3"));
        assert!(CONSUME_RESET_SQL.contains("reset_expires_at > $4"));
        assert!(CONSUME_RESET_SQL.contains("reset_token_hash = NULL"));
    }
}
