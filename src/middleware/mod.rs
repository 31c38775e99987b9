pub mod auth;
pub mod portal;

pub use auth::{require_staff, StaffActor};
pub use portal::PortalClient;
