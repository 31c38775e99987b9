use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::StaffActor;
use crate::models::case::CaseStatus;
use crate::models::prelude::*;
use crate::models::{case, client, document, message_log, status_history};
use crate::services::{CasePatch, CaseUpdateReport};
use crate::state::AppState;

/// Create case routes
pub fn cases_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_cases))
        .route("/{case_id}", get(get_case).patch(update_case))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CaseListParams {
    pub status: Option<String>,
    pub country: Option<String>,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: case::Model,
    pub client: Option<client::Model>,
    pub history: Vec<status_history::Model>,
    pub documents: Vec<document::Model>,
    pub messages: Vec<message_log::Model>,
}

/// Cases, most recently updated first
async fn list_cases(
    State(state): State<AppState>,
    Query(params): Query<CaseListParams>,
) -> Result<Json<Vec<case::Model>>> {
    let mut query = Case::find().order_by_desc(case::Column::UpdatedAt);

    if let Some(raw) = params.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let status = CaseStatus::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{}'", raw)))?;
        query = query.filter(case::Column::CurrentStatus.eq(status));
    }
    if let Some(country) = params.country.as_deref().filter(|c| !c.trim().is_empty()) {
        query = query.filter(
            case::Column::DestinationCountryCode.eq(country.trim().to_ascii_uppercase()),
        );
    }
    if let Some(org_id) = params.organization_id {
        query = query.filter(case::Column::OrganizationId.eq(org_id));
    }

    Ok(Json(query.all(&state.db).await?))
}

async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<CaseDetail>> {
    let (case, client) = Case::find_by_id(case_id)
        .find_also_related(Client)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Case not found".to_string()))?;

    let history = StatusHistory::find()
        .filter(status_history::Column::CaseId.eq(case.id))
        .order_by_desc(status_history::Column::ChangedAt)
        .order_by_desc(status_history::Column::Id)
        .all(&state.db)
        .await?;
    let documents = Document::find()
        .filter(document::Column::CaseId.eq(case.id))
        .order_by_desc(document::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let messages = MessageLog::find()
        .filter(message_log::Column::CaseId.eq(case.id))
        .order_by_desc(message_log::Column::CreatedAt)
        .order_by_desc(message_log::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(CaseDetail {
        case,
        client,
        history,
        documents,
        messages,
    }))
}

async fn update_case(
    State(state): State<AppState>,
    actor: StaffActor,
    Path(case_id): Path<i64>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CaseUpdateReport>> {
    // decoded here so an unknown status maps to a 400 detail
    let patch: CasePatch = serde_json::from_value(body)?;
    let report = state.cases.update_case(case_id, patch, actor.id()).await?;
    Ok(Json(report))
}
