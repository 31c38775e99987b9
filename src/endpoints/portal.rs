//! Client portal: passcode login and read-only case status
//!
//! Every case query here filters by the session's authenticated client id.
//! A case belonging to someone else is reported as not found.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::portal::{clear_portal_cookie, portal_cookie, portal_session_id};
use crate::middleware::PortalClient;
use crate::models::case::{self, CaseStatus};
use crate::models::prelude::*;
use crate::models::status_history;
use crate::services::{normalize_e164, RequestMeta};
use crate::state::AppState;

/// Create portal routes
pub fn portal_routes(state: AppState) -> Router {
    Router::new()
        .route("/start", post(start))
        .route("/verify", post(verify))
        .route("/cases", get(list_cases))
        .route("/cases/{case_code}", get(get_case))
        .route("/logout", post(logout))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub client_code: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub detail: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub client_code: String,
    pub full_name: String,
}

/// What a client may see about their own case
#[derive(Debug, Serialize)]
pub struct PortalCase {
    pub case_code: String,
    pub status: CaseStatus,
    pub status_label: String,
    pub application_type: String,
    pub destination_country_code: String,
    pub next_action: Option<String>,
    pub last_client_update_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<case::Model> for PortalCase {
    fn from(case: case::Model) -> Self {
        Self {
            status_label: case.current_status.label().to_string(),
            application_type: case.application_type.label().to_string(),
            case_code: case.case_code,
            status: case.current_status,
            destination_country_code: case.destination_country_code,
            next_action: case.next_action,
            last_client_update_at: case.last_client_update_at,
            updated_at: case.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PortalHistoryEntry {
    pub old_status: String,
    pub new_status: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PortalCaseDetail {
    #[serde(flatten)]
    pub case: PortalCase,
    pub history: Vec<PortalHistoryEntry>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// First `X-Forwarded-For` entry
fn request_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ============================================================================
// Login Flow
// ============================================================================

/// Request a passcode for (client code, phone)
async fn start(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StartRequest>,
) -> Result<Response> {
    let client_code = req.client_code.trim().to_uppercase();
    let phone = normalize_e164(&req.phone)?;

    let meta = RequestMeta {
        request_ip: request_ip(&headers),
        user_agent: user_agent(&headers),
    };
    let otp = state.otp.request_otp(&client_code, &phone, meta).await?;

    let now = Utc::now();
    let session = match portal_session_id(&headers) {
        Some(id) => state.sessions.load(&id, now).await?,
        None => None,
    };
    let session = match session {
        Some(s) => s,
        None => state.sessions.create(now).await?,
    };
    let session = state
        .sessions
        .set_pending(session, &client_code, &phone)
        .await?;

    let max_age = (session.expires_at - now).num_seconds();
    let cookie = portal_cookie(&session.id, max_age, state.settings.portal.cookie_secure);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(StartResponse {
            detail: "A one-time code has been sent to your phone.".to_string(),
            expires_at: otp.expires_at,
        }),
    )
        .into_response())
}

/// Exchange the passcode for an authenticated session under a new id
async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VerifyRequest>,
) -> Result<Response> {
    let start_first =
        || AppError::BadRequest("No pending login. Call /portal/start first.".to_string());

    let now = Utc::now();
    let id = portal_session_id(&headers).ok_or_else(start_first)?;
    let session = state
        .sessions
        .load(&id, now)
        .await?
        .ok_or_else(start_first)?;
    let (Some(client_code), Some(phone)) = (
        session.portal_client_code.clone(),
        session.portal_phone.clone(),
    ) else {
        return Err(start_first());
    };

    let client = state.otp.verify_otp(&client_code, &phone, &req.otp).await?;
    let session = state.sessions.authenticate(session, client.id, now).await?;

    let max_age = (session.expires_at - now).num_seconds();
    let cookie = portal_cookie(&session.id, max_age, state.settings.portal.cookie_secure);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(VerifyResponse {
            client_code: client.client_code,
            full_name: client.full_name,
        }),
    )
        .into_response())
}

/// Forget the session and expire the cookie
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if let Some(id) = portal_session_id(&headers) {
        state.sessions.clear(&id).await?;
    }
    Ok((
        [(header::SET_COOKIE, clear_portal_cookie())],
        Json(serde_json::json!({"detail": "You have been logged out."})),
    )
        .into_response())
}

// ============================================================================
// Case Status
// ============================================================================

async fn list_cases(
    State(state): State<AppState>,
    portal: PortalClient,
) -> Result<Json<Vec<PortalCase>>> {
    let cases = Case::find()
        .filter(case::Column::ClientId.eq(portal.client_id))
        .order_by_desc(case::Column::UpdatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(cases.into_iter().map(PortalCase::from).collect()))
}

async fn get_case(
    State(state): State<AppState>,
    portal: PortalClient,
    Path(case_code): Path<String>,
) -> Result<Json<PortalCaseDetail>> {
    let case = Case::find()
        .filter(case::Column::ClientId.eq(portal.client_id))
        .filter(case::Column::CaseCode.eq(case_code.trim().to_uppercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Case not found".to_string()))?;

    let history = StatusHistory::find()
        .filter(status_history::Column::CaseId.eq(case.id))
        .order_by_asc(status_history::Column::ChangedAt)
        .order_by_asc(status_history::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|h| PortalHistoryEntry {
            old_status: h.old_status.label().to_string(),
            new_status: h.new_status.label().to_string(),
            changed_at: h.changed_at,
        })
        .collect();

    Ok(Json(PortalCaseDetail {
        case: PortalCase::from(case),
        history,
    }))
}
