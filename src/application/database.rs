use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use crate::config::database::DatabaseConfig;
use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::migrations::Migrator;

pub type DbConn = DatabaseConnection;

/// Connect with the configured database and bring the schema up to date
pub async fn connect() -> Result<DbConn> {
    connect_with(&CONFIG.database).await
}

pub async fn connect_with(config: &DatabaseConfig) -> Result<DbConn> {
    tracing::info!(
        backend = config.backend(),
        max_connections = config.max_connections,
        "Connecting to database"
    );

    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.max_connections(config.max_connections.max(1))
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))?;

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read migration state: {}", e)))?
        .len();
    if pending > 0 {
        tracing::info!(pending, "Applying schema migrations");
        Migrator::up(&db, None)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
    }
    tracing::info!("Database schema is current");

    Ok(db)
}
