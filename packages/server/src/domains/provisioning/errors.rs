use thiserror::Error;

use crate::domains::provisioning::saga::{ProvisioningStep, StepLedger};
use crate::domains::provisioning::types::PartialProgress;

/// Errors raised by the provisioning actions
#[derive(Error, Debug)]
pub enum ProvisioningError {
    /// A create-user step failed. Displays the underlying store/provider
    /// message unchanged.
    #[error("{source}")]
    StepFailed {
        step: ProvisioningStep,
        source: anyhow::Error,
        ledger: StepLedger,
        /// `Some` only when compensation was attempted
        rolled_back: Option<bool>,
    },

    #[error("failed to list users: {0}")]
    ListUsers(#[source] anyhow::Error),

    #[error("{0}")]
    BootstrapIdentity(#[source] anyhow::Error),

    #[error("Admin bootstrap is disabled")]
    BootstrapDisabled,
}

impl ProvisioningError {
    /// Progress made before a create-user failure, for the error payload
    pub fn partial_progress(&self) -> Option<PartialProgress> {
        match self {
            ProvisioningError::StepFailed {
                ledger,
                rolled_back,
                ..
            } => Some(PartialProgress {
                user_id: ledger.user_id(),
                completed_steps: ledger.completed_steps(),
                rolled_back: *rolled_back,
            }),
            _ => None,
        }
    }
}
