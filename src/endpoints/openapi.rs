//! OpenAPI document for the request and response schemas

use axum::Json;
use utoipa::OpenApi;

use crate::models::case::{ApplicationType, CasePriority, CaseStatus};
use crate::models::document::{DocumentStatus, DocumentType};
use crate::models::message_log::MessageStatus;
use crate::models::message_template::Channel;
use crate::services::notification::{MissingTemplate, NotificationEvent, RegistryReport};
use crate::services::{NewCase, NewClient, SideEffectOutcome, SlaReport};

use super::documents::{AddDocumentRequest, UpdateDocumentRequest};
use super::organizations::{CreateBranchRequest, CreateOrganizationRequest, CreateProgramRequest};
use super::staff::CreateStaffRequest;
use super::templates::{CreateTemplateRequest, UpdateTemplateRequest};

#[derive(OpenApi)]
#[openapi(
    info(title = "Visa CRM API", description = "Case tracking, client notifications and portal"),
    components(schemas(
        CaseStatus,
        CasePriority,
        ApplicationType,
        DocumentType,
        DocumentStatus,
        Channel,
        MessageStatus,
        NotificationEvent,
        MissingTemplate,
        RegistryReport,
        SideEffectOutcome,
        SlaReport,
        NewClient,
        NewCase,
        CreateOrganizationRequest,
        CreateBranchRequest,
        CreateProgramRequest,
        CreateStaffRequest,
        CreateTemplateRequest,
        UpdateTemplateRequest,
        AddDocumentRequest,
        UpdateDocumentRequest,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
