use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership of a user in a church beyond their primary `profiles.church_id`
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserChurch {
    pub user_id: Uuid,
    pub church_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl UserChurch {
    pub async fn find_by_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM user_churches WHERE user_id = $1 ORDER BY church_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Bulk insert in one statement. Existing pairs are skipped so a resumed
    /// provisioning can re-send the same list.
    pub async fn insert_many(user_id: Uuid, church_ids: &[Uuid], pool: &PgPool) -> Result<u64> {
        if church_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO user_churches (user_id, church_id)
            SELECT $1, church_id FROM UNNEST($2::uuid[]) AS t(church_id)
            ON CONFLICT (user_id, church_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(church_ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_many(user_id: Uuid, church_ids: &[Uuid], pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM user_churches WHERE user_id = $1 AND church_id = ANY($2)",
        )
        .bind(user_id)
        .bind(church_ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
