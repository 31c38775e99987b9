use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::staff_user;
use crate::state::AppState;

/// Create staff routes
pub fn staff_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .with_state(state)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaffRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: Option<String>,
}

async fn list_staff(State(state): State<AppState>) -> Result<Json<Vec<staff_user::Model>>> {
    let staff = StaffUser::find()
        .order_by_asc(staff_user::Column::Username)
        .all(&state.db)
        .await?;
    Ok(Json(staff))
}

async fn create_staff(
    State(state): State<AppState>,
    Json(req): Json<CreateStaffRequest>,
) -> Result<(StatusCode, Json<staff_user::Model>)> {
    req.validate()?;
    let username = req.username.trim().to_lowercase();

    let taken = StaffUser::find()
        .filter(staff_user::Column::Username.eq(&username))
        .count(&state.db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let staff = staff_user::ActiveModel {
        username: Set(username),
        full_name: Set(req.full_name.trim().to_string()),
        email: Set(req.email),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(staff)))
}
