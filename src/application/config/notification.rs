use chrono::{FixedOffset, Offset, Utc};
use std::env;

/// Offset used when no `CRM_DISPLAY_UTC_OFFSET` is given (Africa/Lagos).
const DEFAULT_OFFSET_SECS: i32 = 3600;

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Offset applied to timestamps rendered into messages
    /// (env: `CRM_DISPLAY_UTC_OFFSET`, e.g. `+01:00`)
    pub display_offset: FixedOffset,
}

impl NotificationConfig {
    pub fn from_env() -> Self {
        let display_offset = env::var("CRM_DISPLAY_UTC_OFFSET")
            .ok()
            .and_then(|v| parse_utc_offset(&v))
            .unwrap_or_else(default_offset);

        Self { display_offset }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_offset: default_offset(),
        }
    }
}

fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parse `+HH:MM`, `-HH:MM` or `Z`
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };

    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+01:00").unwrap().local_minus_utc(), 3600);
        assert_eq!(parse_utc_offset("-05:30").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("01:00").is_none());
        assert!(parse_utc_offset("+25:00").is_none());
    }
}
