//! Step ledger for the multi-step create-user flow.
//!
//! Identity, profile and memberships live in two different stores, so there is
//! no transaction spanning them. Each finished step is recorded here; when a
//! later step fails the [`FailurePolicy`] decides whether the recorded steps
//! stay (so the caller can resume with the returned `user_id`) or are undone
//! in reverse order.

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::kernel::{BaseIdentityAdmin, BaseProfileStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStep {
    CreateIdentity,
    UpsertProfile,
    InsertMemberships,
}

impl std::fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProvisioningStep::CreateIdentity => "create_identity",
            ProvisioningStep::UpsertProfile => "upsert_profile",
            ProvisioningStep::InsertMemberships => "insert_memberships",
        };
        f.write_str(name)
    }
}

/// What to do with completed steps when a later step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Leave completed steps in place and report them
    #[default]
    KeepCompleted,
    /// Undo completed steps, newest first, best effort
    Compensate,
}

/// A finished step plus what is needed to undo it
#[derive(Debug, Clone, PartialEq)]
enum CompletedStep {
    Identity { user_id: Uuid },
    Profile { user_id: Uuid },
    Memberships { user_id: Uuid, church_ids: Vec<Uuid> },
}

impl CompletedStep {
    fn step(&self) -> ProvisioningStep {
        match self {
            CompletedStep::Identity { .. } => ProvisioningStep::CreateIdentity,
            CompletedStep::Profile { .. } => ProvisioningStep::UpsertProfile,
            CompletedStep::Memberships { .. } => ProvisioningStep::InsertMemberships,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepLedger {
    user_id: Option<Uuid>,
    completed: Vec<CompletedStep>,
}

impl StepLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger for an identity created by an earlier request. The identity is
    /// known but not owned, so compensation never deletes it.
    pub fn resuming(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            completed: Vec::new(),
        }
    }

    pub fn identity_created(&mut self, user_id: Uuid) {
        self.user_id = Some(user_id);
        self.completed.push(CompletedStep::Identity { user_id });
    }

    pub fn profile_upserted(&mut self, user_id: Uuid) {
        self.completed.push(CompletedStep::Profile { user_id });
    }

    pub fn memberships_inserted(&mut self, user_id: Uuid, church_ids: Vec<Uuid>) {
        self.completed
            .push(CompletedStep::Memberships { user_id, church_ids });
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn completed_steps(&self) -> Vec<ProvisioningStep> {
        self.completed.iter().map(CompletedStep::step).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Undo completed steps newest first. Keeps going after a failed undo and
    /// returns whether every undo succeeded.
    pub async fn compensate(
        &self,
        identity: &dyn BaseIdentityAdmin,
        profiles: &dyn BaseProfileStore,
    ) -> bool {
        let mut clean = true;

        for completed in self.completed.iter().rev() {
            let result = match completed {
                CompletedStep::Memberships {
                    user_id,
                    church_ids,
                } => profiles
                    .delete_memberships(*user_id, church_ids)
                    .await
                    .map(|_| ()),
                CompletedStep::Profile { user_id } => profiles.delete_profile(*user_id).await,
                CompletedStep::Identity { user_id } => identity.delete_user(*user_id).await,
            };

            match result {
                Ok(()) => info!(step = %completed.step(), "compensated provisioning step"),
                Err(e) => {
                    error!(step = %completed.step(), error = %e, "failed to compensate provisioning step");
                    clean = false;
                }
            }
        }

        if !clean {
            warn!(user_id = ?self.user_id, "rollback incomplete, manual cleanup needed");
        }
        clean
    }
}
