//! Client-side session handling: the inactivity monitor and its config.

pub mod activity;
pub mod config;
pub mod host;
pub mod models;
pub mod monitor;

pub use activity::{ActivitySurface, InputKind};
pub use config::SessionConfig;
pub use host::{ProviderSessionHost, SessionSignal};
pub use monitor::{
    InactivityMonitor, InactivityNotice, MonitorHandle, MonitorState, SessionHost, AUTH_ROUTE,
};
