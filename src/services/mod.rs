pub mod cases;
pub mod clients;
pub mod codes;
pub mod notification;
pub mod otp;
pub mod phone;
pub mod portal;
pub mod scheduler;
pub mod sla;
pub mod transition;

pub use cases::{CasePatch, CaseService, CaseUpdateReport, NewCase, SideEffectOutcome};
pub use clients::{create_client, NewClient};
pub use codes::{allocate_code, next_code, CodeKind};
pub use notification::{
    ConsoleSink, NotificationDispatcher, NotificationEvent, NotificationSink, OutgoingMessage,
    SendResult, TemplateRegistry,
};
pub use otp::{OtpService, RequestMeta};
pub use phone::normalize_e164;
pub use portal::PortalSessionStore;
pub use sla::{run_sla_sweep, SlaReport};
pub use transition::{apply_transition, ClientContact, Transition};
