// Ministry management backend - provisioning service and session monitor
//
// The provisioning domain backs the HTTP handlers in `server`; the session
// domain is the client-side inactivity monitor.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
