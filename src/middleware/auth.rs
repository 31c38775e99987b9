//! Authentication middleware for the staff API
//!
//! Requires `Authorization: Bearer <CRM_STAFF_API_TOKEN>` on every `/api/*`
//! route mounted behind it. An optional `X-Staff-User-Id` header names the
//! staff member acting on the request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::EntityTrait;

use crate::error::AppError;
use crate::models::prelude::*;
use crate::models::staff_user;
use crate::state::AppState;

pub const STAFF_USER_HEADER: &str = "x-staff-user-id";

/// Acting staff member stored in request extensions
#[derive(Clone, Debug, Default)]
pub struct StaffActor(pub Option<staff_user::Model>);

impl StaffActor {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|s| s.id)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for StaffActor {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<StaffActor>().cloned().unwrap_or_default())
    }
}

/// Auth middleware that validates the staff Bearer token
///
/// Returns 401 Unauthorized if the token is missing or wrong, or if no
/// token is configured at all.
pub async fn require_staff(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(expected) = state.settings.auth.staff_api_token.as_deref() else {
        return unauthorized_response("Staff API is disabled");
    };

    let token = match extract_bearer_token(&req) {
        Some(t) => t,
        None => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        return unauthorized_response("Invalid token");
    }

    // header parsed up front; the request body must not be borrowed across the lookup
    let staff_id = match staff_user_id(req.headers()) {
        Ok(id) => id,
        Err(msg) => return unauthorized_response(msg),
    };
    let actor = match resolve_actor(&state, staff_id).await {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    req.extensions_mut().insert(actor);

    next.run(req).await
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.headers().get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

/// Staff id named by `X-Staff-User-Id`, if the header is present
fn staff_user_id(headers: &HeaderMap) -> Result<Option<i64>, &'static str> {
    let Some(raw) = headers.get(STAFF_USER_HEADER) else {
        return Ok(None);
    };
    raw.to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or("Invalid X-Staff-User-Id header")
}

/// Load the acting staff member; unknown or inactive ids are rejected
async fn resolve_actor(state: &AppState, staff_id: Option<i64>) -> Result<StaffActor, Response> {
    let Some(id) = staff_id else {
        return Ok(StaffActor(None));
    };

    let staff = StaffUser::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|e| AppError::Database(e).into_response())?
        .filter(|s| s.is_active)
        .ok_or_else(|| unauthorized_response("Staff user not found or inactive"))?;

    Ok(StaffActor(Some(staff)))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Create a 401 Unauthorized JSON response
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "detail": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret1"));
    }

    #[test]
    fn test_staff_user_id_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(staff_user_id(&headers), Ok(None));

        headers.insert(STAFF_USER_HEADER, " 42 ".parse().unwrap());
        assert_eq!(staff_user_id(&headers), Ok(Some(42)));

        headers.insert(STAFF_USER_HEADER, "abc".parse().unwrap());
        assert_eq!(
            staff_user_id(&headers),
            Err("Invalid X-Staff-User-Id header")
        );
    }
}
