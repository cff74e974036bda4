//! Postgres-backed implementations of the store traits.
//!
//! Thin adapters: every SQL statement lives on the models in domains/*/models.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domains::provisioning::models::{Profile, ProfileUpsert, UserChurch, UserRole};
use crate::domains::session::models::SystemConfig;
use crate::kernel::{BaseConfigStore, BaseProfileStore};

#[derive(Clone)]
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseProfileStore for PostgresProfileStore {
    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<()> {
        Profile::upsert(profile, &self.pool).await?;
        Ok(())
    }

    async fn profile_exists(&self, user_id: Uuid) -> Result<bool> {
        Ok(Profile::count_by_id(user_id, &self.pool).await? > 0)
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<()> {
        Profile::delete(user_id, &self.pool).await?;
        Ok(())
    }

    async fn insert_memberships(&self, user_id: Uuid, church_ids: &[Uuid]) -> Result<u64> {
        UserChurch::insert_many(user_id, church_ids, &self.pool).await
    }

    async fn delete_memberships(&self, user_id: Uuid, church_ids: &[Uuid]) -> Result<u64> {
        UserChurch::delete_many(user_id, church_ids, &self.pool).await
    }

    async fn upsert_role(&self, user_id: Uuid, role: &str) -> Result<()> {
        UserRole::upsert(user_id, role, &self.pool).await?;
        Ok(())
    }

    async fn delete_roles(&self, user_id: Uuid) -> Result<u64> {
        UserRole::delete_for_user(user_id, &self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresConfigStore {
    pool: PgPool,
}

impl PostgresConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseConfigStore for PostgresConfigStore {
    async fn get_values(&self, keys: &[&str]) -> Result<HashMap<String, String>> {
        let rows = SystemConfig::find_by_keys(keys, &self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.config_key, row.config_value))
            .collect())
    }
}
