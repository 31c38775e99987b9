//! Placeholder rendering for message templates
//!
//! Templates use `{name}` fields; `{{` and `}}` produce literal braces.
//! Unknown fields and stray braces are errors, both when a template is
//! saved and when it is rendered.

use serde::Serialize;
use thiserror::Error;

/// Every field a template may reference
pub const PLACEHOLDERS: [&str; 8] = [
    "client_name",
    "client_code",
    "case_code",
    "status",
    "country",
    "app_type",
    "next_action",
    "last_update",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("unbalanced brace at position {0}")]
    UnbalancedBrace(usize),
}

/// Case snapshot the template fields are filled from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub client_name: String,
    pub client_code: String,
    pub case_code: String,
    pub status: String,
    pub country: String,
    pub app_type: String,
    pub next_action: String,
    pub last_update: String,
}

impl RenderContext {
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "client_name" => &self.client_name,
            "client_code" => &self.client_code,
            "case_code" => &self.case_code,
            "status" => &self.status,
            "country" => &self.country,
            "app_type" => &self.app_type,
            "next_action" => &self.next_action,
            "last_update" => &self.last_update,
            _ => return None,
        };
        Some(value.as_str())
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Field(&'a str),
}

fn parse(text: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                segments.push(Segment::Literal(&text[literal_start..=i]));
                i += 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                segments.push(Segment::Literal(&text[literal_start..=i]));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let close = text[i + 1..]
                    .find(['{', '}'])
                    .map(|offset| i + 1 + offset)
                    .filter(|&end| bytes[end] == b'}')
                    .ok_or(TemplateError::UnbalancedBrace(i))?;
                segments.push(Segment::Literal(&text[literal_start..i]));
                segments.push(Segment::Field(&text[i + 1..close]));
                i = close + 1;
                literal_start = i;
            }
            b'}' => return Err(TemplateError::UnbalancedBrace(i)),
            _ => i += 1,
        }
    }
    segments.push(Segment::Literal(&text[literal_start..]));
    Ok(segments)
}

/// Check that `text` only references known placeholders
pub fn validate(text: &str) -> Result<(), TemplateError> {
    for segment in parse(text)? {
        if let Segment::Field(name) = segment {
            if !PLACEHOLDERS.contains(&name) {
                return Err(TemplateError::UnknownPlaceholder(name.to_string()));
            }
        }
    }
    Ok(())
}

pub fn render(text: &str, ctx: &RenderContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    for segment in parse(text)? {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Field(name) => {
                let value = ctx
                    .get(name)
                    .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderContext {
        RenderContext {
            client_name: "Ada Obi".to_string(),
            client_code: "CL-0003".to_string(),
            case_code: "APP-0007".to_string(),
            status: "Documents Received".to_string(),
            country: "CA".to_string(),
            app_type: "Study".to_string(),
            next_action: String::new(),
            last_update: "2026-10-16 09:30".to_string(),
        }
    }

    #[test]
    fn test_render_substitutes_fields() {
        let out = render("Hi {client_name}, {case_code} is now {status}.", &ctx()).unwrap();
        assert_eq!(out, "Hi Ada Obi, APP-0007 is now Documents Received.");
    }

    #[test]
    fn test_render_empty_next_action() {
        assert_eq!(render("Next: [{next_action}]", &ctx()).unwrap(), "Next: []");
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let out = render("{{literal}} {country} }}", &ctx()).unwrap();
        assert_eq!(out, "{literal} CA }");
    }

    #[test]
    fn test_unknown_placeholder_is_error() {
        assert_eq!(
            render("Hello {first_name}", &ctx()),
            Err(TemplateError::UnknownPlaceholder("first_name".to_string()))
        );
    }

    #[test]
    fn test_unbalanced_braces_are_errors() {
        assert_eq!(validate("oops {status"), Err(TemplateError::UnbalancedBrace(5)));
        assert_eq!(validate("oops } here"), Err(TemplateError::UnbalancedBrace(5)));
        assert!(validate("a {b{c}").is_err());
    }

    #[test]
    fn test_validate_accepts_every_placeholder() {
        let all = PLACEHOLDERS
            .iter()
            .map(|p| format!("{{{}}}", p))
            .collect::<Vec<_>>()
            .join(" ");
        assert!(validate(&all).is_ok());
    }

    #[test]
    fn test_multibyte_text_survives() {
        assert_eq!(
            render("Olá {client_name} ✓", &ctx()).unwrap(),
            "Olá Ada Obi ✓"
        );
    }
}
