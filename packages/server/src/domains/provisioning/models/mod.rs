pub mod profile;
pub mod user_church;
pub mod user_role;

pub use profile::{Profile, ProfileUpsert};
pub use user_church::UserChurch;
pub use user_role::UserRole;
