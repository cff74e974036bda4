use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// SystemConfig - persisted key/value application settings
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SystemConfig {
    pub config_key: String,
    pub config_value: String,
    pub updated_at: DateTime<Utc>,
}

impl SystemConfig {
    /// Fetch the rows for the given keys; unknown keys are simply missing
    pub async fn find_by_keys(keys: &[&str], pool: &PgPool) -> Result<Vec<Self>> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();

        sqlx::query_as::<_, Self>("SELECT * FROM system_config WHERE config_key = ANY($1)")
            .bind(keys)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn upsert(key: &str, value: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO system_config (config_key, config_value)
            VALUES ($1, $2)
            ON CONFLICT (config_key) DO UPDATE SET
                config_value = EXCLUDED.config_value,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
