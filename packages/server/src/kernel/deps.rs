//! Server dependencies for handlers (using traits for testability)
//!
//! This module provides the central dependency container used by the
//! provisioning actions. All external services use trait abstractions to
//! enable testing.

use anyhow::Result;
use async_trait::async_trait;
use gotrue::models::AdminCreateUser;
use gotrue::GoTrueService;
use std::sync::Arc;
use uuid::Uuid;

use crate::domains::provisioning::saga::FailurePolicy;
use crate::domains::provisioning::types::AdminBootstrapSettings;
use crate::kernel::{BaseIdentityAdmin, BaseProfileStore, IdentityRecord, NewIdentity};

// =============================================================================
// GoTrueService Adapter (implements BaseIdentityAdmin trait)
// =============================================================================

/// Wrapper around GoTrueService that implements BaseIdentityAdmin trait
pub struct GoTrueAdapter(pub Arc<GoTrueService>);

impl GoTrueAdapter {
    pub fn new(service: Arc<GoTrueService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseIdentityAdmin for GoTrueAdapter {
    async fn create_user(&self, new_identity: NewIdentity) -> Result<IdentityRecord> {
        let body = AdminCreateUser {
            email: new_identity.email,
            password: new_identity.password,
            email_confirm: new_identity.email_confirm,
            user_metadata: new_identity.user_metadata,
        };

        let user = self.0.create_user(&body).await?;
        Ok(IdentityRecord {
            id: user.id,
            email: user.email,
        })
    }

    async fn list_users(&self) -> Result<Vec<IdentityRecord>> {
        let users = self.0.list_all_users().await?;
        Ok(users
            .into_iter()
            .map(|user| IdentityRecord {
                id: user.id,
                email: user.email,
            })
            .collect())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        self.0.delete_user(user_id).await.map_err(Into::into)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.0.sign_out(access_token).await.map_err(Into::into)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to handlers (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub identity: Arc<dyn BaseIdentityAdmin>,
    pub profiles: Arc<dyn BaseProfileStore>,
    /// What create-user does with completed steps when a later step fails
    pub failure_policy: FailurePolicy,
    pub admin_bootstrap: AdminBootstrapSettings,
}

impl ServerDeps {
    pub fn new(
        identity: Arc<dyn BaseIdentityAdmin>,
        profiles: Arc<dyn BaseProfileStore>,
        failure_policy: FailurePolicy,
        admin_bootstrap: AdminBootstrapSettings,
    ) -> Self {
        Self {
            identity,
            profiles,
            failure_policy,
            admin_bootstrap,
        }
    }
}
