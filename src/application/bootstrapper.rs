//! Application bootstrapper
//!
//! Handles all initialization and setup for the CRM backend.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use chrono::Utc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::CONFIG;
use crate::db;
use crate::endpoints;
use crate::services::{run_sla_sweep, scheduler, ConsoleSink, SlaReport, TemplateRegistry};
use crate::state::{AppState, Settings};

/// Bootstrap and run the HTTP service
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting visa-crm v{}", env!("CARGO_PKG_VERSION"));

    let state = init_services().await?;

    // Report notification events with no active template
    if let Err(e) = TemplateRegistry::check_all(&state.db).await {
        tracing::warn!("Template registry check failed: {}", e);
    }

    scheduler::start_scheduler(&state);

    let app = create_app(state);

    serve(app).await
}

/// One-shot SLA sweep for cron-style invocation
pub async fn check_sla(days: Option<i64>) -> anyhow::Result<SlaReport> {
    init_tracing();

    let state = init_services().await?;
    let days = days.unwrap_or(state.settings.sla.days);
    let report = run_sla_sweep(
        &state.db,
        &state.notifier,
        days,
        state.settings.sla.batch_limit,
        Utc::now(),
    )
    .await?;
    Ok(report)
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("visa_crm={}", CONFIG.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();
}

/// Connect the database and build shared state
async fn init_services() -> anyhow::Result<AppState> {
    let conn = db::connect().await?;
    tracing::info!("Database connection established");

    Ok(AppState::new(
        conn,
        Arc::new(ConsoleSink),
        Settings::from_config(&CONFIG),
    ))
}

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&CONFIG.server.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    cors.allow_origin(origins)
}

/// Start the HTTP server
async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", CONFIG.server.host, CONFIG.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
