//! Provisioning actions - business logic functions
//!
//! Handlers in server/routes call these with `ServerDeps`; they never touch
//! HTTP types.

mod bootstrap_admin;
mod cleanup_users;
mod create_user;

pub use bootstrap_admin::bootstrap_admin;
pub use cleanup_users::cleanup_users;
pub use create_user::create_user;
