use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::StaffActor;
use crate::models::prelude::*;
use crate::models::{case, client};
use crate::services::{create_client, CaseUpdateReport, NewCase, NewClient};
use crate::state::AppState;

/// Create client routes
pub fn clients_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client_handler))
        .route("/{client_id}", get(get_client))
        .route("/{client_id}/cases", post(open_case))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ClientListParams {
    pub organization_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: client::Model,
    pub cases: Vec<case::Model>,
}

async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ClientListParams>,
) -> Result<Json<Vec<client::Model>>> {
    let mut query = Client::find().order_by_desc(client::Column::CreatedAt);
    if let Some(org_id) = params.organization_id {
        query = query.filter(client::Column::OrganizationId.eq(org_id));
    }
    Ok(Json(query.all(&state.db).await?))
}

async fn create_client_handler(
    State(state): State<AppState>,
    Json(req): Json<NewClient>,
) -> Result<(StatusCode, Json<client::Model>)> {
    let client = create_client(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Result<Json<ClientDetail>> {
    let client = Client::find_by_id(client_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
    let cases = Case::find()
        .filter(case::Column::ClientId.eq(client.id))
        .order_by_desc(case::Column::UpdatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(ClientDetail { client, cases }))
}

async fn open_case(
    State(state): State<AppState>,
    actor: StaffActor,
    Path(client_id): Path<i64>,
    Json(req): Json<NewCase>,
) -> Result<(StatusCode, Json<CaseUpdateReport>)> {
    let report = state.cases.create_case(client_id, req, actor.id()).await?;
    Ok((StatusCode::CREATED, Json(report)))
}
