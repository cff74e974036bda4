// Business domains
pub mod provisioning;
pub mod session;
