use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::middleware::StaffActor;
use crate::models::document::{self, DocumentStatus, DocumentType};
use crate::models::prelude::*;
use crate::state::AppState;

/// Create document routes (case-scoped and by id)
pub fn documents_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/cases/{case_id}/documents",
            get(list_documents).post(add_document),
        )
        .route("/documents/{document_id}", patch(update_document))
        .with_state(state)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddDocumentRequest {
    pub doc_type: DocumentType,
    pub file_path: Option<String>,
    pub description: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDocumentRequest {
    pub status: Option<DocumentStatus>,
    pub description: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    /// A new upload replaces the file and bumps `version`
    pub file_path: Option<String>,
}

async fn list_documents(
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<Vec<document::Model>>> {
    let docs = Document::find()
        .filter(document::Column::CaseId.eq(case_id))
        .order_by_asc(document::Column::DocType)
        .order_by_desc(document::Column::Version)
        .all(&state.db)
        .await?;
    Ok(Json(docs))
}

async fn add_document(
    State(state): State<AppState>,
    actor: StaffActor,
    Path(case_id): Path<i64>,
    Json(req): Json<AddDocumentRequest>,
) -> Result<(StatusCode, Json<document::Model>)> {
    Case::find_by_id(case_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Case not found".to_string()))?;

    let now = Utc::now();
    let status = if req.file_path.is_some() {
        DocumentStatus::Submitted
    } else {
        DocumentStatus::Pending
    };
    let doc = document::ActiveModel {
        case_id: Set(case_id),
        doc_type: Set(req.doc_type),
        status: Set(status),
        file_path: Set(req.file_path),
        description: Set(req.description),
        expiry_date: Set(req.expiry_date),
        version: Set(1),
        uploaded_by_id: Set(actor.id()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(doc)))
}

async fn update_document(
    State(state): State<AppState>,
    actor: StaffActor,
    Path(document_id): Path<i64>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<document::Model>> {
    let existing = Document::find_by_id(document_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let version = existing.version;
    let mut doc = existing.into_active_model();
    if let Some(status) = req.status {
        doc.status = Set(status);
    }
    if let Some(description) = req.description {
        doc.description = Set(Some(description));
    }
    if let Some(expiry) = req.expiry_date {
        doc.expiry_date = Set(Some(expiry));
    }
    if let Some(path) = req.file_path {
        doc.file_path = Set(Some(path));
        doc.version = Set(version + 1);
        doc.uploaded_by_id = Set(actor.id());
        if req.status.is_none() {
            doc.status = Set(DocumentStatus::Submitted);
        }
    }
    doc.updated_at = Set(Utc::now());

    Ok(Json(doc.update(&state.db).await?))
}
