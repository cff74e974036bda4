//! Minimal client for the GoTrue admin API (the auth server behind the hosted
//! database). Only the calls the provisioning handlers and the session monitor
//! need: create, list, delete and logout.

pub mod models;

use reqwest::{header, Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{AdminCreateUser, AuthUser, ErrorBody, UserEnvelope, UserPage};

/// Page size used when walking the full user list
pub const DEFAULT_PER_PAGE: u32 = 1000;

#[derive(Debug, Error)]
pub enum GoTrueError {
    /// The auth server answered with a non-success status. `message` is the
    /// server's own text, passed through untouched.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("auth server request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GoTrueError {
    /// HTTP status returned by the auth server, if it answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GoTrueError::Api { status, .. } => Some(*status),
            GoTrueError::Transport(e) => e.status(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoTrueOptions {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    pub service_role_key: String,
}

#[derive(Debug, Clone)]
pub struct GoTrueService {
    options: GoTrueOptions,
    client: Client,
}

impl GoTrueService {
    pub fn new(options: GoTrueOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.options.url.trim_end_matches('/'), path)
    }

    fn admin_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Ok(value) = self.options.service_role_key.parse() {
            headers.insert("apikey", value);
        }
        if let Ok(value) = format!("Bearer {}", self.options.service_role_key).parse() {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    /// Create a user through the admin endpoint.
    pub async fn create_user(&self, body: &AdminCreateUser) -> Result<AuthUser, GoTrueError> {
        debug!(email = %body.email, "creating auth user");

        let response = self
            .client
            .post(self.endpoint("/admin/users"))
            .headers(self.admin_headers())
            .json(body)
            .send()
            .await?;

        let envelope = check(response).await?.json::<UserEnvelope>().await?;
        Ok(envelope.into_user())
    }

    /// Fetch one page of users (1-based page index).
    pub async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<AuthUser>, GoTrueError> {
        let response = self
            .client
            .get(self.endpoint("/admin/users"))
            .headers(self.admin_headers())
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        let page = check(response).await?.json::<UserPage>().await?;
        Ok(page.users)
    }

    /// Walk every page until a short page comes back.
    pub async fn list_all_users(&self) -> Result<Vec<AuthUser>, GoTrueError> {
        let mut users = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.list_users(page, DEFAULT_PER_PAGE).await?;
            let done = (batch.len() as u32) < DEFAULT_PER_PAGE;
            users.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        Ok(users)
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), GoTrueError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/admin/users/{}", user_id)))
            .headers(self.admin_headers())
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Revoke the session behind `access_token` (local scope only).
    pub async fn sign_out(&self, access_token: &str) -> Result<(), GoTrueError> {
        let response = self
            .client
            .post(self.endpoint("/logout"))
            .header("apikey", &self.options.service_role_key)
            .bearer_auth(access_token)
            .query(&[("scope", "local")])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into `GoTrueError::Api`, keeping the server's message.
async fn check(response: Response) -> Result<Response, GoTrueError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_message(status, &text);
    warn!(status = %status, message = %message, "auth server returned an error");

    Err(GoTrueError::Api { status, message })
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("auth server error")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(url: &str) -> GoTrueService {
        GoTrueService::new(GoTrueOptions {
            url: url.to_string(),
            service_role_key: "service-role".to_string(),
        })
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let svc = service("https://abc.supabase.co/");
        assert_eq!(
            svc.endpoint("/admin/users"),
            "https://abc.supabase.co/auth/v1/admin/users"
        );
    }

    #[test]
    fn test_admin_headers_carry_service_key() {
        let headers = service("http://localhost:9999").admin_headers();
        assert_eq!(headers.get("apikey").unwrap(), "service-role");
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer service-role"
        );
    }

    #[test]
    fn test_error_message_passes_server_text_through() {
        let msg = error_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"msg":"Password should be at least 6 characters"}"#,
        );
        assert_eq!(msg, "Password should be at least 6 characters");

        let plain = error_message(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(plain, "upstream down");

        let empty = error_message(StatusCode::NOT_FOUND, "");
        assert_eq!(empty, "Not Found");
    }

    #[test]
    fn test_api_error_displays_message_verbatim() {
        let err = GoTrueError::Api {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "A user with this email address has already been registered".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "A user with this email address has already been registered"
        );
        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    }
}
