//! Client intake

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::codes::{allocate_code, CodeKind};
use super::phone::normalize_e164;
use crate::error::{AppError, Result};
use crate::models::client;
use crate::models::prelude::*;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewClient {
    pub organization_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    /// Any common formatting; stored as E.164
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    /// IANA zone name, defaults to the organization's
    pub timezone: Option<String>,
    pub preferred_language: Option<String>,
    pub source: Option<String>,
}

/// Validate, assign the next `CL-` code and insert in one transaction
pub async fn create_client(db: &DatabaseConnection, mut new: NewClient) -> Result<client::Model> {
    new.full_name = new.full_name.trim().to_string();
    new.email = new
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    new.validate()?;
    let phone = normalize_e164(&new.phone)?;

    let org = Organization::find_by_id(new.organization_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    let txn = db.begin().await?;
    let code = allocate_code(&txn, CodeKind::Client).await?;
    let now = Utc::now();
    let model = client::ActiveModel {
        organization_id: Set(org.id),
        client_code: Set(code),
        full_name: Set(new.full_name),
        phone_e164: Set(phone),
        email: Set(new.email),
        timezone: Set(non_blank(new.timezone).unwrap_or(org.default_timezone)),
        preferred_language: Set(non_blank(new.preferred_language).unwrap_or(org.default_language)),
        source: Set(non_blank(new.source)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(
        client_code = %model.client_code,
        organization_id = model.organization_id,
        "Client created"
    );
    Ok(model)
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
