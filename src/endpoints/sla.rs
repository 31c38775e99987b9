use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::services::{run_sla_sweep, SlaReport};
use crate::state::AppState;

/// Create SLA routes
pub fn sla_routes(state: AppState) -> Router {
    Router::new()
        .route("/check", post(check_sla))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SlaParams {
    pub days: Option<i64>,
}

/// Run the sweep now and report what it did
async fn check_sla(
    State(state): State<AppState>,
    Query(params): Query<SlaParams>,
) -> Result<Json<SlaReport>> {
    let days = params.days.unwrap_or(state.settings.sla.days);
    if days < 0 {
        return Err(AppError::BadRequest("days must not be negative".to_string()));
    }
    let report = run_sla_sweep(
        &state.db,
        &state.notifier,
        days,
        state.settings.sla.batch_limit,
        Utc::now(),
    )
    .await?;
    Ok(Json(report))
}
