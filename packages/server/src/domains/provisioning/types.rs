use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::provisioning::models::ProfileUpsert;
use crate::domains::provisioning::saga::ProvisioningStep;

/// The one identity that bulk cleanup never deletes
pub const ADMIN_EMAIL: &str = "admin@sistema.com";

/// Bootstrap password used when none is configured. Known weak default:
/// operators are expected to override it or disable bootstrap after first use.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const ADMIN_FULL_NAME: &str = "Administrador";

pub const ADMIN_ROLE: &str = "admin";

/// Case-insensitive match against [`ADMIN_EMAIL`], ignoring surrounding
/// whitespace. Identities created by hand may differ in case from the seeded
/// address and must still be protected from cleanup.
pub fn is_admin_email(email: Option<&str>) -> bool {
    email.is_some_and(|e| e.trim().eq_ignore_ascii_case(ADMIN_EMAIL))
}

/// Empty strings become NULL so optional unique columns (cpf) don't collide on ""
pub fn nullable_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Body of `POST /create-user`
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreationRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    pub church_id: Uuid,
    #[serde(default)]
    pub region_id: Option<Uuid>,
    #[serde(default)]
    pub area_id: Option<Uuid>,
    #[serde(default)]
    pub additional_churches: Vec<Uuid>,
    /// Existing identity to resume provisioning for. Skips identity creation.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl UserCreationRequest {
    /// Profile row for the identity `user_id`
    pub fn profile_for(&self, user_id: Uuid) -> ProfileUpsert {
        ProfileUpsert {
            id: user_id,
            full_name: self.full_name.clone(),
            phone: nullable_text(self.phone.as_deref()),
            cpf: nullable_text(self.cpf.as_deref()),
            church_id: Some(self.church_id),
            region_id: self.region_id,
            area_id: self.area_id,
            email: Some(self.email.clone()),
        }
    }
}

/// Result of a fully completed create-user
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedUser {
    pub user_id: Uuid,
    pub resumed: bool,
    pub memberships_inserted: u64,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub success: bool,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub resumed: bool,
}

impl From<CreatedUser> for CreateUserResponse {
    fn from(created: CreatedUser) -> Self {
        Self {
            success: true,
            user_id: created.user_id,
            resumed: created.resumed,
        }
    }
}

/// Outcome of deleting one identity during cleanup
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeletionOutcome {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Whether the identity is gone
    pub deleted: bool,
    /// Why the identity delete failed, or which of its rows were left behind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub results: Vec<DeletionOutcome>,
}

impl CleanupReport {
    /// Successful deletions only, not attempts
    pub fn deleted_count(&self) -> usize {
        self.results.iter().filter(|r| r.deleted).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.deleted_count()
    }
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub success: bool,
    pub deleted_count: usize,
    pub failed_count: usize,
    pub results: Vec<DeletionOutcome>,
}

impl From<CleanupReport> for CleanupResponse {
    fn from(report: CleanupReport) -> Self {
        Self {
            success: true,
            deleted_count: report.deleted_count(),
            failed_count: report.failed_count(),
            results: report.results,
        }
    }
}

/// Settings for the administrator bootstrap handler
#[derive(Debug, Clone)]
pub struct AdminBootstrapSettings {
    pub enabled: bool,
    pub password: String,
}

impl Default for AdminBootstrapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapReport {
    pub user_id: Uuid,
    /// False when an existing administrator identity was reused
    pub created: bool,
    /// Profile / role failures; these do not fail the bootstrap
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub email: &'static str,
    pub created: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<BootstrapReport> for BootstrapResponse {
    fn from(report: BootstrapReport) -> Self {
        Self {
            success: true,
            user_id: report.user_id,
            email: ADMIN_EMAIL,
            created: report.created,
            warnings: report.warnings,
        }
    }
}

/// Failure payload for create-user: which steps finished before the error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PartialProgress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub completed_steps: Vec<ProvisioningStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolled_back: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_text_blanks_become_none() {
        assert_eq!(nullable_text(None), None);
        assert_eq!(nullable_text(Some("")), None);
        assert_eq!(nullable_text(Some("   ")), None);
        assert_eq!(
            nullable_text(Some(" 123.456.789-00 ")),
            Some("123.456.789-00".to_string())
        );
    }

    #[test]
    fn test_admin_email_match_ignores_case() {
        assert!(is_admin_email(Some("admin@sistema.com")));
        assert!(is_admin_email(Some("Admin@Sistema.com")));
        assert!(is_admin_email(Some("  ADMIN@sistema.com ")));
        assert!(!is_admin_email(Some("pastor@sistema.com")));
        assert!(!is_admin_email(None));
    }

    #[test]
    fn test_request_defaults_optional_fields() {
        let church = Uuid::new_v4();
        let request: UserCreationRequest = serde_json::from_value(serde_json::json!({
            "email": "joao@igreja.org",
            "password": "segredo123",
            "full_name": "João Silva",
            "phone": "",
            "cpf": "",
            "church_id": church,
        }))
        .unwrap();

        assert!(request.additional_churches.is_empty());
        assert!(request.user_id.is_none());

        let user_id = Uuid::new_v4();
        let profile = request.profile_for(user_id);
        assert_eq!(profile.id, user_id);
        assert_eq!(profile.phone, None);
        assert_eq!(profile.cpf, None);
        assert_eq!(profile.church_id, Some(church));
        assert_eq!(profile.email.as_deref(), Some("joao@igreja.org"));
    }

    #[test]
    fn test_cleanup_report_counts_successes_only() {
        let outcome = |deleted: bool| DeletionOutcome {
            user_id: Uuid::new_v4(),
            email: None,
            deleted,
            error: (!deleted).then(|| "boom".to_string()),
        };
        let report = CleanupReport {
            results: vec![outcome(true), outcome(false), outcome(true)],
        };
        assert_eq!(report.deleted_count(), 2);
        assert_eq!(report.failed_count(), 1);
    }
}
