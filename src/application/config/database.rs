use std::env;

use super::env_parse;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `CRM_DATABASE_URL`, falling back to `DATABASE_URL`; SQLite or Postgres
    pub database_url: String,
    /// Pool size (env: `CRM_DATABASE_MAX_CONNECTIONS`)
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("CRM_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or_else(|_| "sqlite://visa_crm.db?mode=rwc".to_string()),
            max_connections: env_parse("CRM_DATABASE_MAX_CONNECTIONS", 10),
        }
    }

    /// Backend name for logs, without credentials
    pub fn backend(&self) -> &'static str {
        if self.database_url.starts_with("postgres") {
            "postgres"
        } else if self.database_url.starts_with("sqlite") {
            "sqlite"
        } else {
            "unknown"
        }
    }
}
