//! Administrator bootstrap action

use serde_json::json;
use tracing::{error, info, warn};

use crate::domains::provisioning::errors::ProvisioningError;
use crate::domains::provisioning::models::ProfileUpsert;
use crate::domains::provisioning::types::{
    is_admin_email, BootstrapReport, ADMIN_EMAIL, ADMIN_FULL_NAME, ADMIN_ROLE,
};
use crate::kernel::{NewIdentity, ServerDeps};

/// Create (or reuse) the administrator identity, then upsert its profile and
/// admin role.
///
/// Only the identity step can fail the call. Profile and role failures are
/// logged and returned as warnings alongside the identity id. Running it again
/// reuses the existing identity, so repeated calls converge on one admin.
pub async fn bootstrap_admin(deps: &ServerDeps) -> Result<BootstrapReport, ProvisioningError> {
    let settings = &deps.admin_bootstrap;
    if !settings.enabled {
        warn!("admin bootstrap requested while disabled");
        return Err(ProvisioningError::BootstrapDisabled);
    }

    let existing = match deps.identity.list_users().await {
        Ok(users) => users
            .into_iter()
            .find(|user| is_admin_email(user.email.as_deref())),
        Err(e) => {
            // Fall through to create; a duplicate will surface as a create error
            warn!(error = %e, "could not list users before admin bootstrap");
            None
        }
    };

    let (user_id, created) = match existing {
        Some(user) => {
            info!(user_id = %user.id, "admin identity already exists, reusing it");
            (user.id, false)
        }
        None => {
            let record = deps
                .identity
                .create_user(NewIdentity {
                    email: ADMIN_EMAIL.to_string(),
                    password: settings.password.clone(),
                    email_confirm: true,
                    user_metadata: json!({ "full_name": ADMIN_FULL_NAME }),
                })
                .await
                .map_err(|e| {
                    error!(error = %e, "failed to create admin identity");
                    ProvisioningError::BootstrapIdentity(e)
                })?;
            info!(user_id = %record.id, "admin identity created");
            (record.id, true)
        }
    };

    let mut warnings = Vec::new();

    let profile = ProfileUpsert {
        id: user_id,
        full_name: ADMIN_FULL_NAME.to_string(),
        phone: None,
        cpf: None,
        church_id: None,
        region_id: None,
        area_id: None,
        email: Some(ADMIN_EMAIL.to_string()),
    };
    if let Err(e) = deps.profiles.upsert_profile(&profile).await {
        error!(user_id = %user_id, error = %e, "failed to upsert admin profile");
        warnings.push(format!("profile: {}", e));
    }

    if let Err(e) = deps.profiles.upsert_role(user_id, ADMIN_ROLE).await {
        error!(user_id = %user_id, error = %e, "failed to assign admin role");
        warnings.push(format!("role: {}", e));
    }

    Ok(BootstrapReport {
        user_id,
        created,
        warnings,
    })
}
