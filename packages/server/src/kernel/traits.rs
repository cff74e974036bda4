// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Provisioning and session logic live in domains/ and talk to the outside world
// through these seams, so tests can swap in the mocks from test_dependencies.
//
// Naming convention: Base* for trait names (e.g., BaseIdentityAdmin)

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domains::provisioning::models::ProfileUpsert;

// =============================================================================
// Identity Provider Trait (Infrastructure - auth server admin API)
// =============================================================================

/// Account to create in the identity provider
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    /// Skip the confirmation email; the account is usable immediately
    pub email_confirm: bool,
    pub user_metadata: serde_json::Value,
}

/// Identity record as seen by the provisioning domain
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub email: Option<String>,
}

#[async_trait]
pub trait BaseIdentityAdmin: Send + Sync {
    /// Create an identity. Errors carry the provider's message unchanged.
    async fn create_user(&self, new_identity: NewIdentity) -> Result<IdentityRecord>;

    /// List every identity (all pages)
    async fn list_users(&self) -> Result<Vec<IdentityRecord>>;

    async fn delete_user(&self, user_id: Uuid) -> Result<()>;

    /// End the session that owns `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

// =============================================================================
// Profile Store Trait (Infrastructure - relational profile data)
// =============================================================================

#[async_trait]
pub trait BaseProfileStore: Send + Sync {
    /// Insert or update the profile row keyed on `profile.id`
    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<()>;

    async fn profile_exists(&self, user_id: Uuid) -> Result<bool>;

    /// Delete the profile; its church memberships go with it
    async fn delete_profile(&self, user_id: Uuid) -> Result<()>;

    /// Insert church memberships, returns how many rows were new
    async fn insert_memberships(&self, user_id: Uuid, church_ids: &[Uuid]) -> Result<u64>;

    async fn delete_memberships(&self, user_id: Uuid, church_ids: &[Uuid]) -> Result<u64>;

    async fn upsert_role(&self, user_id: Uuid, role: &str) -> Result<()>;

    /// Revoke every role of the user, returns how many were removed
    async fn delete_roles(&self, user_id: Uuid) -> Result<u64>;

    /// Cheap reachability check for health reporting
    async fn ping(&self) -> Result<()>;
}

// =============================================================================
// Config Store Trait (Infrastructure - persisted key/value configuration)
// =============================================================================

#[async_trait]
pub trait BaseConfigStore: Send + Sync {
    /// Fetch the requested keys. Missing keys are simply absent from the map.
    async fn get_values(&self, keys: &[&str]) -> Result<HashMap<String, String>>;
}
