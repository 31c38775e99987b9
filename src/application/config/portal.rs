use super::{env_flag, env_parse};

/// Client portal and one-time passcode settings
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Minutes an issued passcode stays valid (env: `CRM_OTP_TTL_MINUTES`)
    pub otp_ttl_minutes: i64,
    /// Passcodes a client may request per trailing hour (env: `CRM_OTP_MAX_PER_HOUR`)
    pub otp_max_per_hour: u64,
    /// Lifetime of a portal session cookie (env: `CRM_PORTAL_SESSION_HOURS`)
    pub session_hours: i64,
    /// Mark the portal cookie `Secure` (env: `CRM_PORTAL_COOKIE_SECURE`)
    pub cookie_secure: bool,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        Self {
            otp_ttl_minutes: env_parse("CRM_OTP_TTL_MINUTES", 10),
            otp_max_per_hour: env_parse("CRM_OTP_MAX_PER_HOUR", 5),
            session_hours: env_parse("CRM_PORTAL_SESSION_HOURS", 12),
            cookie_secure: env_flag("CRM_PORTAL_COOKIE_SECURE"),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            otp_ttl_minutes: 10,
            otp_max_per_hour: 5,
            session_hours: 12,
            cookie_secure: false,
        }
    }
}
