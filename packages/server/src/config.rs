use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::provisioning::{AdminBootstrapSettings, FailurePolicy, DEFAULT_ADMIN_PASSWORD};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub auth_url: String,
    pub auth_service_role_key: String,
    pub admin_bootstrap_password: String,
    pub admin_bootstrap_enabled: bool,
    /// Undo completed create-user steps when a later step fails
    pub provisioning_rollback: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            auth_url: env::var("AUTH_URL").context("AUTH_URL must be set")?,
            auth_service_role_key: env::var("AUTH_SERVICE_ROLE_KEY")
                .context("AUTH_SERVICE_ROLE_KEY must be set")?,
            admin_bootstrap_password: env::var("ADMIN_BOOTSTRAP_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
            admin_bootstrap_enabled: parse_flag("ADMIN_BOOTSTRAP_ENABLED", true)?,
            provisioning_rollback: parse_flag("PROVISIONING_ROLLBACK", false)?,
        })
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.provisioning_rollback {
            FailurePolicy::Compensate
        } else {
            FailurePolicy::KeepCompleted
        }
    }

    pub fn admin_bootstrap(&self) -> AdminBootstrapSettings {
        AdminBootstrapSettings {
            enabled: self.admin_bootstrap_enabled,
            password: self.admin_bootstrap_password.clone(),
        }
    }
}

fn parse_flag(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(raw) => flag_value(&raw).with_context(|| format!("{name} must be true or false")),
        Err(_) => Ok(default),
    }
}

fn flag_value(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rollback: bool) -> Config {
        Config {
            database_url: "postgres://localhost/ministry".to_string(),
            port: 8080,
            auth_url: "http://localhost:9999".to_string(),
            auth_service_role_key: "service-role".to_string(),
            admin_bootstrap_password: "s3cret".to_string(),
            admin_bootstrap_enabled: false,
            provisioning_rollback: rollback,
        }
    }

    #[test]
    fn test_flag_values() {
        assert_eq!(flag_value(" TRUE "), Some(true));
        assert_eq!(flag_value("0"), Some(false));
        assert_eq!(flag_value("maybe"), None);
    }

    #[test]
    fn test_failure_policy_follows_rollback_flag() {
        assert_eq!(config(false).failure_policy(), FailurePolicy::KeepCompleted);
        assert_eq!(config(true).failure_policy(), FailurePolicy::Compensate);
    }

    #[test]
    fn test_admin_bootstrap_settings() {
        let settings = config(false).admin_bootstrap();
        assert!(!settings.enabled);
        assert_eq!(settings.password, "s3cret");
    }
}
