//! Create user action

use serde_json::json;
use tracing::{error, info, warn};

use crate::domains::provisioning::errors::ProvisioningError;
use crate::domains::provisioning::saga::{FailurePolicy, ProvisioningStep, StepLedger};
use crate::domains::provisioning::types::{CreatedUser, UserCreationRequest};
use crate::kernel::{NewIdentity, ServerDeps};

/// Create identity, profile and church memberships for a new user.
///
/// Steps run in order and stop at the first failure:
/// 1. create the identity (email confirmed up front, no email sent)
/// 2. upsert the profile keyed on the identity id
/// 3. insert `additional_churches` memberships, if any
///
/// A request carrying `user_id` resumes an earlier partial run: step 1 is
/// skipped and steps 2-3 are replayed, both of which are idempotent.
pub async fn create_user(
    request: UserCreationRequest,
    deps: &ServerDeps,
) -> Result<CreatedUser, ProvisioningError> {
    let (mut ledger, user_id, resumed) = match request.user_id {
        Some(user_id) => {
            info!(user_id = %user_id, "resuming user provisioning");
            (StepLedger::resuming(user_id), user_id, true)
        }
        None => {
            let new_identity = NewIdentity {
                email: request.email.clone(),
                password: request.password.clone(),
                email_confirm: true,
                user_metadata: json!({ "full_name": request.full_name }),
            };

            match deps.identity.create_user(new_identity).await {
                Ok(record) => {
                    info!(user_id = %record.id, email = %request.email, "identity created");
                    let mut ledger = StepLedger::new();
                    ledger.identity_created(record.id);
                    (ledger, record.id, false)
                }
                Err(e) => {
                    error!(email = %request.email, error = %e, "identity creation failed");
                    return Err(ProvisioningError::StepFailed {
                        step: ProvisioningStep::CreateIdentity,
                        source: e,
                        ledger: StepLedger::new(),
                        rolled_back: None,
                    });
                }
            }
        }
    };

    // A profile left by an earlier run is not ours to undo
    let profile_existed = if resumed {
        deps.profiles
            .profile_exists(user_id)
            .await
            .unwrap_or_else(|e| {
                warn!(user_id = %user_id, error = %e, "could not check for an existing profile");
                true
            })
    } else {
        false
    };

    let profile = request.profile_for(user_id);
    if let Err(e) = deps.profiles.upsert_profile(&profile).await {
        error!(user_id = %user_id, error = %e, "profile upsert failed");
        return Err(fail(ProvisioningStep::UpsertProfile, e, ledger, deps).await);
    }
    if !profile_existed {
        ledger.profile_upserted(user_id);
    }

    let mut memberships_inserted = 0;
    if !request.additional_churches.is_empty() {
        match deps
            .profiles
            .insert_memberships(user_id, &request.additional_churches)
            .await
        {
            Ok(inserted) => {
                memberships_inserted = inserted;
                ledger.memberships_inserted(user_id, request.additional_churches.clone());
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "church membership insert failed");
                return Err(fail(ProvisioningStep::InsertMemberships, e, ledger, deps).await);
            }
        }
    }

    info!(
        user_id = %user_id,
        memberships = memberships_inserted,
        resumed,
        "user provisioned"
    );

    Ok(CreatedUser {
        user_id,
        resumed,
        memberships_inserted,
    })
}

/// Apply the failure policy to what has been done so far and build the error.
async fn fail(
    step: ProvisioningStep,
    source: anyhow::Error,
    ledger: StepLedger,
    deps: &ServerDeps,
) -> ProvisioningError {
    let rolled_back = match deps.failure_policy {
        FailurePolicy::KeepCompleted => {
            if let Some(user_id) = ledger.user_id() {
                info!(
                    user_id = %user_id,
                    completed = ?ledger.completed_steps(),
                    "keeping completed provisioning steps; retry with user_id to resume"
                );
            }
            None
        }
        FailurePolicy::Compensate if ledger.is_empty() => None,
        FailurePolicy::Compensate => Some(
            ledger
                .compensate(deps.identity.as_ref(), deps.profiles.as_ref())
                .await,
        ),
    };

    ProvisioningError::StepFailed {
        step,
        source,
        ledger,
        rolled_back,
    }
}
