pub mod cases;
pub mod clients;
pub mod documents;
pub mod messages;
pub mod openapi;
pub mod organizations;
pub mod portal;
pub mod sla;
pub mod staff;
pub mod templates;

use axum::{middleware as axum_middleware, routing::get, Router};

use crate::config::CONFIG;
use crate::middleware::require_staff;
use crate::state::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/system/version", get(get_version))
        .route("/api/openapi.json", get(openapi::openapi_json))
        .nest("/portal", portal::portal_routes(state.clone()));

    // Staff routes (bearer token required)
    let protected_routes = Router::new()
        .nest("/api", api_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(state, require_staff));

    public_routes.merge(protected_routes)
}

/// Staff API routes under /api/*
fn api_routes(state: AppState) -> Router {
    Router::new()
        .nest(
            "/organizations",
            organizations::organizations_routes(state.clone()),
        )
        .nest("/staff", staff::staff_routes(state.clone()))
        .nest("/clients", clients::clients_routes(state.clone()))
        .nest("/cases", cases::cases_routes(state.clone()))
        .nest("/templates", templates::templates_routes(state.clone()))
        .nest("/messages", messages::messages_routes(state.clone()))
        .nest("/sla", sla::sla_routes(state.clone()))
        .merge(documents::documents_routes(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "build_time": CONFIG.build_time,
    }))
}
