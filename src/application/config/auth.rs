use std::env;

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Shared bearer token for the staff API (env: `CRM_STAFF_API_TOKEN`).
    /// When unset every staff request is rejected.
    pub staff_api_token: Option<String>,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            staff_api_token: env::var("CRM_STAFF_API_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}
