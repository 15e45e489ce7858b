use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Activity entry owned by exactly one user. Created by explicit client
/// action, only aggregated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub done: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Activity {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        description: &str,
    ) -> sqlx::Result<Activity> {
        sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (user_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, description, done, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .fetch_one(db)
        .await
    }

    pub async fn count_for_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activities WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(db)
            .await
    }

    pub async fn count_completed_for_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM activities WHERE user_id = $1 AND done = TRUE",
        )
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    /// Most recent activities for the caller, newest first.
    pub async fn recent_for_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> sqlx::Result<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, user_id, title, description, done, created_at, updated_at
            FROM activities
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
    }
}
