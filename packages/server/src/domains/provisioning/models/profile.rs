use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Profile - per-user business data, 1:1 with an identity
///
/// `id` is always the identity provider's user id. Contact and organisation
/// fields are denormalised here so list views never touch the auth server.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub church_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a profile row
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpsert {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub church_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub email: Option<String>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Profile {
    /// Find profile by identity id
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert or update keyed on id. Re-running with the same data is a no-op
    /// apart from `updated_at`.
    pub async fn upsert(input: &ProfileUpsert, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO profiles (id, full_name, phone, cpf, church_id, region_id, area_id, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                cpf = EXCLUDED.cpf,
                church_id = EXCLUDED.church_id,
                region_id = EXCLUDED.region_id,
                area_id = EXCLUDED.area_id,
                email = EXCLUDED.email,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(input.id)
        .bind(&input.full_name)
        .bind(&input.phone)
        .bind(&input.cpf)
        .bind(input.church_id)
        .bind(input.region_id)
        .bind(input.area_id)
        .bind(&input.email)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Delete profile (memberships and roles cascade)
    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Count rows for an id (always 0 or 1; used to check upsert idempotence)
    pub async fn count_by_id(id: Uuid, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }
}
