use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::organizations::find_organization;
use crate::error::{AppError, Result};
use crate::models::message_template::{self, Channel};
use crate::models::prelude::*;
use crate::services::notification::template;
use crate::state::AppState;

/// Create message template routes
pub fn templates_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route("/{template_id}", put(update_template))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct TemplateListParams {
    pub organization_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTemplateRequest {
    pub organization_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub channel: Channel,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub subject: Option<String>,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTemplateRequest {
    pub is_active: Option<bool>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Reject text the renderer would fail on
fn check_text(field: &str, text: &str) -> Result<()> {
    template::validate(text).map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", field, e)))
}

async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateListParams>,
) -> Result<Json<Vec<message_template::Model>>> {
    let mut query = MessageTemplate::find()
        .order_by_asc(message_template::Column::Name)
        .order_by_asc(message_template::Column::Channel);
    if let Some(org_id) = params.organization_id {
        query = query.filter(message_template::Column::OrganizationId.eq(org_id));
    }
    Ok(Json(query.all(&state.db).await?))
}

async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<message_template::Model>)> {
    req.validate()?;
    let org = find_organization(&state, req.organization_id).await?;
    let name = req.name.trim().to_uppercase();
    check_text("body", &req.body)?;
    if let Some(subject) = &req.subject {
        check_text("subject", subject)?;
    }

    let duplicate = MessageTemplate::find()
        .filter(message_template::Column::OrganizationId.eq(org.id))
        .filter(message_template::Column::Name.eq(&name))
        .filter(message_template::Column::Channel.eq(req.channel))
        .count(&state.db)
        .await?;
    if duplicate > 0 {
        return Err(AppError::Conflict(format!(
            "Template {} for {} already exists",
            name, req.channel
        )));
    }

    let created = message_template::ActiveModel {
        organization_id: Set(org.id),
        name: Set(name),
        channel: Set(req.channel),
        is_active: Set(req.is_active),
        subject: Set(req.subject.filter(|s| !s.is_empty())),
        body: Set(req.body),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(
        organization_id = created.organization_id,
        template = %created.name,
        channel = %created.channel,
        "Message template created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<i64>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<Json<message_template::Model>> {
    let existing = MessageTemplate::find_by_id(template_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;

    let mut active = existing.into_active_model();
    if let Some(body) = req.body {
        check_text("body", &body)?;
        active.body = Set(body);
    }
    if let Some(subject) = req.subject {
        check_text("subject", &subject)?;
        active.subject = Set(Some(subject).filter(|s| !s.is_empty()));
    }
    if let Some(is_active) = req.is_active {
        active.is_active = Set(is_active);
    }

    Ok(Json(active.update(&state.db).await?))
}
