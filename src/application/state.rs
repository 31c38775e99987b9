use std::sync::Arc;

use crate::config::auth::AuthConfig;
use crate::config::notification::NotificationConfig;
use crate::config::portal::PortalConfig;
use crate::config::sla::SlaConfig;
use crate::config::Config;
use crate::db::DbConn;
use crate::services::{
    CaseService, NotificationDispatcher, NotificationSink, OtpService, PortalSessionStore,
};

/// Runtime settings the request handlers and tasks read
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub auth: AuthConfig,
    pub portal: PortalConfig,
    pub notification: NotificationConfig,
    pub sla: SlaConfig,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auth: config.auth.clone(),
            portal: config.portal.clone(),
            notification: config.notification.clone(),
            sla: config.sla.clone(),
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub notifier: NotificationDispatcher,
    pub cases: CaseService,
    pub otp: OtpService,
    pub sessions: PortalSessionStore,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: DbConn, sink: Arc<dyn NotificationSink>, settings: Settings) -> Self {
        let notifier =
            NotificationDispatcher::new(db.clone(), sink, settings.notification.display_offset);
        let cases = CaseService::new(db.clone(), notifier.clone());
        let otp = OtpService::new(db.clone(), notifier.clone(), settings.portal.clone());
        let sessions = PortalSessionStore::new(db.clone(), settings.portal.session_hours);

        Self {
            db,
            notifier,
            cases,
            otp,
            sessions,
            settings: Arc::new(settings),
        }
    }
}
