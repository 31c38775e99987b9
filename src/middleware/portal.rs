//! Portal session cookie and the authenticated-client extractor

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use chrono::Utc;

use crate::error::AppError;
use crate::models::portal_session;
use crate::state::AppState;

pub const PORTAL_COOKIE_NAME: &str = "crm_portal_session";

/// Create the portal cookie carrying the session id
pub fn portal_cookie(session_id: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        PORTAL_COOKIE_NAME,
        session_id,
        max_age_secs.max(0),
        if secure { "; Secure" } else { "" }
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Create a cookie that clears the portal session
pub fn clear_portal_cookie() -> HeaderValue {
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        PORTAL_COOKIE_NAME
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Extract the portal session id from the cookie header
pub fn portal_session_id(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = value.to_str() else {
            continue;
        };
        for cookie in cookie_str.split(';') {
            let cookie = cookie.trim();
            if let Some(value) = cookie.strip_prefix(&format!("{}=", PORTAL_COOKIE_NAME)) {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Verified portal visitor. Every case query in portal handlers filters by
/// `client_id`.
#[derive(Debug, Clone)]
pub struct PortalClient {
    pub client_id: i64,
    pub session: portal_session::Model,
}

impl FromRequestParts<AppState> for PortalClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || AppError::Unauthorized("Portal login required".to_string());

        let id = portal_session_id(&parts.headers).ok_or_else(unauthorized)?;
        let session = state
            .sessions
            .load(&id, Utc::now())
            .await?
            .ok_or_else(unauthorized)?;
        let client_id = session.client_id.ok_or_else(unauthorized)?;

        Ok(PortalClient { client_id, session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; crm_portal_session=abc-123"),
        );
        assert_eq!(portal_session_id(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_empty_cookie_is_no_session() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("crm_portal_session="));
        assert_eq!(portal_session_id(&headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = portal_cookie("abc", 3600, true);
        let s = cookie.to_str().unwrap();
        assert!(s.starts_with("crm_portal_session=abc;"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("Max-Age=3600"));
        assert!(s.ends_with("; Secure"));
        assert!(clear_portal_cookie().to_str().unwrap().contains("Max-Age=0"));
    }
}
