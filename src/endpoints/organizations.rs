use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::case::ApplicationType;
use crate::models::prelude::*;
use crate::models::{branch, organization, program};
use crate::services::cases::normalize_country_code;
use crate::services::notification::RegistryReport;
use crate::services::TemplateRegistry;
use crate::state::AppState;

static SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Create organization routes
pub fn organizations_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route("/{org_id}", get(get_organization))
        .route("/{org_id}/branches", get(list_branches).post(create_branch))
        .route("/{org_id}/programs", get(list_programs).post(create_program))
        .route("/{org_id}/templates/check", get(check_templates))
        .with_state(state)
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 80))]
    pub slug: String,
    pub default_timezone: Option<String>,
    pub default_language: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBranchRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub country_code: String,
    pub city: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProgramRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub destination_country_code: String,
    pub application_type: ApplicationType,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[validate(range(min = 1, max = 365))]
    #[serde(default = "default_sla_days")]
    pub update_sla_days: i32,
}

fn default_active() -> bool {
    true
}

fn default_sla_days() -> i32 {
    7
}

// ============================================================================
// Helper Functions
// ============================================================================

pub(crate) async fn find_organization(
    state: &AppState,
    org_id: i64,
) -> Result<organization::Model> {
    Organization::find_by_id(org_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))
}

// ============================================================================
// Organization Endpoints
// ============================================================================

async fn list_organizations(State(state): State<AppState>) -> Result<Json<Vec<organization::Model>>> {
    let orgs = Organization::find()
        .order_by_asc(organization::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(orgs))
}

async fn create_organization(
    State(state): State<AppState>,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<organization::Model>)> {
    req.validate()?;
    let slug = req.slug.trim().to_lowercase();
    if !SLUG.is_match(&slug) {
        return Err(AppError::BadRequest(
            "Slug may only contain lowercase letters, digits and single dashes".to_string(),
        ));
    }

    let taken = Organization::find()
        .filter(organization::Column::Slug.eq(&slug))
        .count(&state.db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("Slug already exists".to_string()));
    }

    let now = Utc::now();
    let org = organization::ActiveModel {
        name: Set(req.name.trim().to_string()),
        slug: Set(slug),
        default_timezone: Set(req
            .default_timezone
            .unwrap_or_else(|| "Africa/Lagos".to_string())),
        default_language: Set(req.default_language.unwrap_or_else(|| "en".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(slug = %org.slug, "Organization created");
    Ok((StatusCode::CREATED, Json(org)))
}

async fn get_organization(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
) -> Result<Json<organization::Model>> {
    Ok(Json(find_organization(&state, org_id).await?))
}

// ============================================================================
// Branch Endpoints
// ============================================================================

async fn list_branches(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
) -> Result<Json<Vec<branch::Model>>> {
    let branches = Branch::find()
        .filter(branch::Column::OrganizationId.eq(org_id))
        .order_by_asc(branch::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(branches))
}

async fn create_branch(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Json(req): Json<CreateBranchRequest>,
) -> Result<(StatusCode, Json<branch::Model>)> {
    req.validate()?;
    let org = find_organization(&state, org_id).await?;
    let country_code = normalize_country_code(&req.country_code)?;

    let now = Utc::now();
    let branch = branch::ActiveModel {
        organization_id: Set(org.id),
        name: Set(req.name.trim().to_string()),
        country_code: Set(country_code),
        city: Set(req.city.filter(|c| !c.trim().is_empty())),
        timezone: Set(req.timezone.unwrap_or(org.default_timezone)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(branch)))
}

// ============================================================================
// Program Endpoints
// ============================================================================

async fn list_programs(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
) -> Result<Json<Vec<program::Model>>> {
    let programs = Program::find()
        .filter(program::Column::OrganizationId.eq(org_id))
        .order_by_asc(program::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(programs))
}

async fn create_program(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
    Json(req): Json<CreateProgramRequest>,
) -> Result<(StatusCode, Json<program::Model>)> {
    req.validate()?;
    let org = find_organization(&state, org_id).await?;
    let country = normalize_country_code(&req.destination_country_code)?;
    let name = req.name.trim().to_string();

    let duplicate = Program::find()
        .filter(program::Column::OrganizationId.eq(org.id))
        .filter(program::Column::Name.eq(&name))
        .count(&state.db)
        .await?;
    if duplicate > 0 {
        return Err(AppError::Conflict(format!(
            "Program '{}' already exists",
            name
        )));
    }

    let now = Utc::now();
    let program = program::ActiveModel {
        organization_id: Set(org.id),
        name: Set(name),
        destination_country_code: Set(country),
        application_type: Set(req.application_type),
        is_active: Set(req.is_active),
        update_sla_days: Set(req.update_sla_days),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(program)))
}

// ============================================================================
// Template Registry
// ============================================================================

/// Which notification events lack an active template
async fn check_templates(
    State(state): State<AppState>,
    Path(org_id): Path<i64>,
) -> Result<Json<RegistryReport>> {
    let org = find_organization(&state, org_id).await?;
    Ok(Json(TemplateRegistry::check(&state.db, org.id).await?))
}
