use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Body of `POST /auth/v1/admin/users`
#[derive(Debug, Clone, Serialize)]
pub struct AdminCreateUser {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub user_metadata: Value,
}

/// User record as returned by the admin API (only the fields we read)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

/// Admin create responses come back either bare or wrapped in `{ "user": ... }`
/// depending on the server version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserEnvelope {
    Wrapped { user: AuthUser },
    Bare(AuthUser),
}

impl UserEnvelope {
    pub(crate) fn into_user(self) -> AuthUser {
        match self {
            UserEnvelope::Wrapped { user } => user,
            UserEnvelope::Bare(user) => user,
        }
    }
}

/// One page of `GET /auth/v1/admin/users`
#[derive(Debug, Clone, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<AuthUser>,
}

/// Error payload shapes GoTrue has used across versions.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}
