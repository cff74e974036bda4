//! `SessionHost` backed by the identity provider.
//!
//! Sign-out goes to the auth server with the user's access token; notice and
//! redirect are handed to the UI layer as [`SessionSignal`]s.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domains::session::monitor::{InactivityNotice, SessionHost};
use crate::kernel::BaseIdentityAdmin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    Notice(InactivityNotice),
    Redirect(String),
}

pub struct ProviderSessionHost {
    identity: Arc<dyn BaseIdentityAdmin>,
    access_token: String,
    signals: mpsc::UnboundedSender<SessionSignal>,
}

impl ProviderSessionHost {
    /// Returns the host and the receiving end the UI should drain
    pub fn new(
        identity: Arc<dyn BaseIdentityAdmin>,
        access_token: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionSignal>) {
        let (signals, rx) = mpsc::unbounded_channel();
        let host = Self {
            identity,
            access_token: access_token.into(),
            signals,
        };
        (host, rx)
    }

    fn send(&self, signal: SessionSignal) {
        if self.signals.send(signal).is_err() {
            debug!("session signal dropped, UI receiver is gone");
        }
    }
}

#[async_trait]
impl SessionHost for ProviderSessionHost {
    async fn sign_out(&self) -> Result<()> {
        self.identity.sign_out(&self.access_token).await
    }

    fn show_notice(&self, notice: &InactivityNotice) {
        self.send(SessionSignal::Notice(notice.clone()));
    }

    fn redirect(&self, route: &str) {
        self.send(SessionSignal::Redirect(route.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockIdentityAdmin;

    #[tokio::test]
    async fn test_sign_out_uses_access_token() {
        let identity = Arc::new(MockIdentityAdmin::new());
        let (host, _rx) = ProviderSessionHost::new(identity.clone(), "user-jwt");

        host.sign_out().await.unwrap();
        assert_eq!(identity.sign_out_calls(), vec!["user-jwt".to_string()]);
    }

    #[tokio::test]
    async fn test_notice_and_redirect_reach_ui() {
        let identity = Arc::new(MockIdentityAdmin::new());
        let (host, mut rx) = ProviderSessionHost::new(identity, "user-jwt");

        host.show_notice(&InactivityNotice { idle_minutes: 10 });
        host.redirect("/auth");

        assert_eq!(
            rx.recv().await,
            Some(SessionSignal::Notice(InactivityNotice { idle_minutes: 10 }))
        );
        assert_eq!(rx.recv().await, Some(SessionSignal::Redirect("/auth".to_string())));
    }

    #[test]
    fn test_signals_after_ui_gone_are_ignored() {
        let identity = Arc::new(MockIdentityAdmin::new());
        let (host, rx) = ProviderSessionHost::new(identity, "user-jwt");
        drop(rx);
        host.redirect("/auth");
    }
}
