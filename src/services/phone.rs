//! Phone intake: validate and normalize to E.164

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};

static E164: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").unwrap());

/// Normalize `input` to E.164 (`+2348012345678`).
///
/// Spaces, dashes, dots and parentheses are stripped and a leading `00`
/// international prefix becomes `+`. Numbers without a country code are
/// rejected.
pub fn normalize_e164(input: &str) -> Result<String> {
    let compact: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    let candidate = match compact.strip_prefix("00") {
        Some(rest) => format!("+{}", rest),
        None => compact,
    };

    if E164.is_match(&candidate) {
        Ok(candidate)
    } else {
        Err(AppError::BadRequest(
            "Enter a valid phone number in E.164 format, e.g. +2348012345678".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_e164() {
        assert_eq!(normalize_e164("+2348012345678").unwrap(), "+2348012345678");
    }

    #[test]
    fn test_strips_formatting() {
        assert_eq!(
            normalize_e164(" +234 (801) 234-5678 ").unwrap(),
            "+2348012345678"
        );
        assert_eq!(normalize_e164("0044 20 7946 0958").unwrap(), "+442079460958");
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(normalize_e164("08012345678").is_err());
        assert!(normalize_e164("+0123456789").is_err());
        assert!(normalize_e164("+234abc").is_err());
        assert!(normalize_e164("").is_err());
        assert!(normalize_e164("+1234567890123456").is_err());
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        // Arabic-Indic and fullwidth digits
        assert!(normalize_e164("+2\u{0663}\u{0664}8012345678").is_err());
        assert!(normalize_e164("+\u{FF12}348012345678").is_err());
    }
}
