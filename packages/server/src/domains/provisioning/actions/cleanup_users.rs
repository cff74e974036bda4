//! Bulk cleanup action

use tracing::{error, info};
use uuid::Uuid;

use crate::domains::provisioning::errors::ProvisioningError;
use crate::domains::provisioning::types::{is_admin_email, CleanupReport, DeletionOutcome};
use crate::kernel::ServerDeps;

/// Delete every identity except the administrator, along with its profile,
/// memberships and roles.
///
/// A failed delete is logged and recorded, then the batch moves on. Only a
/// failure to list identities fails the whole call.
pub async fn cleanup_users(deps: &ServerDeps) -> Result<CleanupReport, ProvisioningError> {
    let users = deps
        .identity
        .list_users()
        .await
        .map_err(ProvisioningError::ListUsers)?;

    info!(total = users.len(), "starting user cleanup");

    let mut report = CleanupReport::default();
    for user in users {
        if is_admin_email(user.email.as_deref()) {
            continue;
        }

        let outcome = match deps.identity.delete_user(user.id).await {
            Ok(()) => {
                info!(user_id = %user.id, email = ?user.email, "user deleted");
                let error = remove_user_rows(deps, user.id).await;
                DeletionOutcome {
                    user_id: user.id,
                    email: user.email,
                    deleted: true,
                    error,
                }
            }
            Err(e) => {
                error!(user_id = %user.id, email = ?user.email, error = %e, "failed to delete user");
                DeletionOutcome {
                    user_id: user.id,
                    email: user.email,
                    deleted: false,
                    error: Some(e.to_string()),
                }
            }
        };
        report.results.push(outcome);
    }

    info!(
        deleted = report.deleted_count(),
        failed = report.failed_count(),
        "user cleanup complete"
    );

    Ok(report)
}

/// Drop the relational rows of a deleted identity. Returns the failures, if
/// any; the identity itself is already gone either way.
async fn remove_user_rows(deps: &ServerDeps, user_id: Uuid) -> Option<String> {
    let mut failures = Vec::new();

    if let Err(e) = deps.profiles.delete_profile(user_id).await {
        error!(user_id = %user_id, error = %e, "failed to delete profile of removed user");
        failures.push(format!("profile: {}", e));
    }
    if let Err(e) = deps.profiles.delete_roles(user_id).await {
        error!(user_id = %user_id, error = %e, "failed to delete roles of removed user");
        failures.push(format!("roles: {}", e));
    }

    if failures.is_empty() {
        None
    } else {
        Some(failures.join("; "))
    }
}
