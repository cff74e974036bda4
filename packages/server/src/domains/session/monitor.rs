//! Inactivity session monitor.
//!
//! ```text
//!            mount (enabled)                 deadline passes
//!   ──────────────────────────► Tracking ───────────────────────► Expired
//!            │                   │    ▲                           (sign out,
//!            │ mount (disabled)  │    │ qualifying input           notice,
//!            ▼                   │    │ (deadline = now + T)       redirect)
//!         Disabled               └────┘
//!                                │ unmount
//!                                ▼
//!                             Stopped
//! ```
//!
//! One tokio task per mount owns the activity timestamp and a single pinned
//! `Sleep`; input resets that sleep in place, so exactly one deadline is armed
//! and expiry runs at most once per mount.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domains::session::activity::{ActivityState, ActivitySurface, InputKind};
use crate::domains::session::config::SessionConfig;
use crate::kernel::BaseConfigStore;

/// Where the user lands after an inactivity sign-out
pub const AUTH_ROUTE: &str = "/auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Tracking,
    Expired,
    Disabled,
    Stopped,
}

/// User-facing notice shown when the session is ended for inactivity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityNotice {
    pub idle_minutes: u32,
}

impl InactivityNotice {
    pub fn message(&self) -> String {
        format!(
            "Your session was ended after {} minutes of inactivity. Please sign in again.",
            self.idle_minutes
        )
    }
}

/// What the monitor drives when the session expires
#[async_trait]
pub trait SessionHost: Send + Sync {
    /// End the session with the identity provider
    async fn sign_out(&self) -> Result<()>;

    fn show_notice(&self, notice: &InactivityNotice);

    fn redirect(&self, route: &str);
}

pub struct InactivityMonitor {
    surface: ActivitySurface,
    host: Arc<dyn SessionHost>,
}

impl InactivityMonitor {
    pub fn new(surface: ActivitySurface, host: Arc<dyn SessionHost>) -> Self {
        Self { surface, host }
    }

    /// Load the session config from the store and start monitoring.
    pub async fn mount(&self, store: &dyn BaseConfigStore) -> MonitorHandle {
        let config = SessionConfig::load(store).await;
        self.mount_with(config)
    }

    /// Start monitoring with an already-loaded config. Must be called inside a
    /// tokio runtime when the config is enabled.
    pub fn mount_with(&self, config: SessionConfig) -> MonitorHandle {
        let shutdown = CancellationToken::new();

        if !config.inactivity_enabled {
            info!("inactivity timeout disabled, monitor is inert");
            let (_, state) = watch::channel(MonitorState::Disabled);
            return MonitorHandle {
                config,
                state,
                shutdown,
                task: None,
            };
        }

        let (state_tx, state) = watch::channel(MonitorState::Tracking);
        let listener = self.surface.listen();
        let task = tokio::spawn(track(
            config,
            Instant::now(),
            listener,
            self.host.clone(),
            state_tx,
            shutdown.clone(),
        ));

        debug!(timeout_minutes = config.timeout_minutes, "inactivity monitor mounted");

        MonitorHandle {
            config,
            state,
            shutdown,
            task: Some(task),
        }
    }
}

/// Handle to one mounted monitor. Dropping it cancels the pending deadline;
/// [`MonitorHandle::unmount`] also waits for the listener to be released.
pub struct MonitorHandle {
    config: SessionConfig,
    state: watch::Receiver<MonitorState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    /// Watch state transitions (e.g. to react to `Expired` in the UI)
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.clone()
    }

    /// Cancel the deadline and release the input listener.
    pub async fn unmount(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "inactivity monitor task ended abnormally");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn track(
    config: SessionConfig,
    mounted_at: Instant,
    mut listener: broadcast::Receiver<InputKind>,
    host: Arc<dyn SessionHost>,
    state: watch::Sender<MonitorState>,
    shutdown: CancellationToken,
) {
    let timeout = config.timeout();
    let mut activity = ActivityState::new(mounted_at);
    let mut listening = true;

    let deadline = tokio::time::sleep_until(activity.deadline(timeout));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            // Teardown wins over a deadline that is due in the same poll
            biased;

            _ = shutdown.cancelled() => {
                debug!("inactivity monitor unmounted");
                state.send_replace(MonitorState::Stopped);
                return;
            }

            _ = &mut deadline => {
                let idle = Instant::now().saturating_duration_since(activity.last_activity());
                info!(
                    timeout_minutes = config.timeout_minutes,
                    idle_secs = idle.as_secs(),
                    "session expired after inactivity"
                );
                expire(&config, host.as_ref()).await;
                state.send_replace(MonitorState::Expired);
                return;
            }

            received = listener.recv(), if listening => match received {
                Ok(kind) if kind.is_qualifying() => {
                    activity.touch(Instant::now());
                    deadline.as_mut().reset(activity.deadline(timeout));
                }
                Ok(_) => {}
                // Some of the dropped events may have been qualifying
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "inactivity monitor lagged behind input events");
                    activity.touch(Instant::now());
                    deadline.as_mut().reset(activity.deadline(timeout));
                }
                Err(RecvError::Closed) => {
                    debug!("input surface closed, waiting out the current deadline");
                    listening = false;
                }
            },
        }
    }
}

async fn expire(config: &SessionConfig, host: &dyn SessionHost) {
    if let Err(e) = host.sign_out().await {
        warn!(error = %e, "provider sign-out failed, ending local session anyway");
    }

    host.show_notice(&InactivityNotice {
        idle_minutes: config.timeout_minutes,
    });
    host.redirect(AUTH_ROUTE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_mentions_minutes() {
        let notice = InactivityNotice { idle_minutes: 30 };
        assert!(notice.message().contains("30 minutes"));
    }
}
