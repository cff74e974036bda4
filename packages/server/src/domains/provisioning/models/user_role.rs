use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRole {
    pub async fn find_by_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_roles WHERE user_id = $1 ORDER BY role")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Grant a role; granting it twice is a no-op
    pub async fn upsert(user_id: Uuid, role: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO UPDATE SET role = EXCLUDED.role
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete_for_user(user_id: Uuid, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
