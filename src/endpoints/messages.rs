use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Deserialize;

use crate::error::Result;
use crate::models::message_log::{self, MessageStatus};
use crate::models::prelude::*;
use crate::state::AppState;

/// Create message log routes
pub fn messages_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_messages))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct MessageListParams {
    pub case_id: Option<i64>,
    pub client_id: Option<i64>,
    pub status: Option<MessageStatus>,
    pub limit: Option<u64>,
}

/// Delivery log, newest first
async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageListParams>,
) -> Result<Json<Vec<message_log::Model>>> {
    let mut query = MessageLog::find()
        .order_by_desc(message_log::Column::CreatedAt)
        .order_by_desc(message_log::Column::Id);
    if let Some(case_id) = params.case_id {
        query = query.filter(message_log::Column::CaseId.eq(case_id));
    }
    if let Some(client_id) = params.client_id {
        query = query.filter(message_log::Column::ClientId.eq(client_id));
    }
    if let Some(status) = params.status {
        query = query.filter(message_log::Column::Status.eq(status));
    }
    let logs = query
        .limit(params.limit.unwrap_or(100).min(500))
        .all(&state.db)
        .await?;
    Ok(Json(logs))
}
