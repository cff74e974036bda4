//! User provisioning: create users, bulk cleanup and admin bootstrap against
//! the identity provider and the profile store.

pub mod actions;
pub mod errors;
pub mod models;
pub mod saga;
pub mod types;

pub use actions::*;
pub use errors::ProvisioningError;
pub use saga::{FailurePolicy, ProvisioningStep, StepLedger};
pub use types::*;
