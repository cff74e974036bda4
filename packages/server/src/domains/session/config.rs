use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::kernel::BaseConfigStore;

/// `system_config` key holding the idle timeout in whole minutes
pub const TIMEOUT_MINUTES_KEY: &str = "session_timeout_minutes";

/// `system_config` key holding `"true"`/`"false"`
pub const INACTIVITY_ENABLED_KEY: &str = "session_inactivity_timeout";

pub const DEFAULT_TIMEOUT_MINUTES: u32 = 30;

/// Idle-timeout policy, read once per monitor mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    pub timeout_minutes: u32,
    pub inactivity_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            inactivity_enabled: true,
        }
    }
}

impl SessionConfig {
    /// Build from raw config rows. Missing or malformed values keep their default.
    pub fn from_entries(entries: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        let timeout_minutes = match entries.get(TIMEOUT_MINUTES_KEY) {
            Some(raw) => parse_minutes(raw).unwrap_or_else(|| {
                debug!(value = %raw, "ignoring malformed session timeout");
                defaults.timeout_minutes
            }),
            None => defaults.timeout_minutes,
        };

        let inactivity_enabled = match entries.get(INACTIVITY_ENABLED_KEY) {
            Some(raw) => parse_flag(raw).unwrap_or_else(|| {
                debug!(value = %raw, "ignoring malformed inactivity flag");
                defaults.inactivity_enabled
            }),
            None => defaults.inactivity_enabled,
        };

        Self {
            timeout_minutes,
            inactivity_enabled,
        }
    }

    /// Read from the config store; any store failure yields the defaults.
    pub async fn load(store: &dyn BaseConfigStore) -> Self {
        match store
            .get_values(&[TIMEOUT_MINUTES_KEY, INACTIVITY_ENABLED_KEY])
            .await
        {
            Ok(entries) => Self::from_entries(&entries),
            Err(e) => {
                warn!(error = %e, "could not load session config, using defaults");
                Self::default()
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_minutes) * 60)
    }
}

fn parse_minutes(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|minutes| *minutes > 0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
