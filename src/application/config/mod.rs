pub mod auth;
pub mod database;
pub mod notification;
pub mod portal;
pub mod server;
pub mod sla;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub auth: auth::AuthConfig,
    pub portal: portal::PortalConfig,
    pub notification: notification::NotificationConfig,
    pub sla: sla::SlaConfig,

    // Build info
    pub commit_hash: String,
    pub build_time: String,
    pub version: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            auth: auth::AuthConfig::from_env(),
            portal: portal::PortalConfig::from_env(),
            notification: notification::NotificationConfig::from_env(),
            sla: sla::SlaConfig::from_env(),

            // Build info
            commit_hash: env::var("COMMIT_HASH").unwrap_or_else(|_| "unknown".to_string()),
            build_time: env::var("BUILD_TIME").unwrap_or_else(|_| "unknown".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            // Logging
            log_level: env::var("CRM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

/// Read a numeric variable, falling back to `default` when unset or unparsable
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a boolean flag ("true"/"1", case-insensitive)
pub(crate) fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false)
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
