pub mod branch;
pub mod case;
pub mod client;
pub mod code_sequence;
pub mod document;
pub mod message_log;
pub mod message_template;
pub mod one_time_password;
pub mod organization;
pub mod portal_session;
pub mod program;
pub mod staff_user;
pub mod status_history;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::branch::{self, Entity as Branch};
    pub use super::case::{self, Entity as Case};
    pub use super::client::{self, Entity as Client};
    pub use super::code_sequence::{self, Entity as CodeSequence};
    pub use super::document::{self, Entity as Document};
    pub use super::message_log::{self, Entity as MessageLog};
    pub use super::message_template::{self, Entity as MessageTemplate};
    pub use super::one_time_password::{self, Entity as OneTimePassword};
    pub use super::organization::{self, Entity as Organization};
    pub use super::portal_session::{self, Entity as PortalSession};
    pub use super::program::{self, Entity as Program};
    pub use super::staff_user::{self, Entity as StaffUser};
    pub use super::status_history::{self, Entity as StatusHistory};
}
