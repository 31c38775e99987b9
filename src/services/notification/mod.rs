//! Outbound client notifications
//!
//! The dispatcher resolves a template, renders it against a case snapshot,
//! records a `message_logs` row and hands the message to a pluggable sink.
//! Delivery problems never surface as errors: they end up as FAILED logs.

mod console;
pub mod registry;
pub mod template;

pub use console::ConsoleSink;
pub use registry::{MissingTemplate, NotificationEvent, RegistryReport, TemplateRegistry};
pub use template::{RenderContext, TemplateError};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;

use crate::error::Result;
use crate::models::message_log::MessageStatus;
use crate::models::message_template::Channel;
use crate::models::{case, client, message_log, message_template};

/// A rendered message ready for a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
}

/// Result of sending a notification
#[derive(Debug, Clone)]
pub struct SendResult {
    pub success: bool,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
}

impl SendResult {
    pub fn sent(provider_message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            provider_message_id: Some(provider_message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            provider_message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Delivery provider (console demo, WhatsApp gateway, SMTP, ...)
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Name stored in `message_logs.provider`
    fn provider(&self) -> &'static str;
    async fn send(&self, message: &OutgoingMessage) -> SendResult;
}

/// WhatsApp goes to the phone; every other channel to the email on file
pub fn recipient_for(client: &client::Model, channel: Channel) -> String {
    match channel {
        Channel::Whatsapp => client.phone_e164.clone(),
        _ => client.email.clone().unwrap_or_default(),
    }
}

/// Snapshot of a case for template rendering
pub fn build_render_context(
    case: &case::Model,
    client: &client::Model,
    display_offset: FixedOffset,
    now: DateTime<Utc>,
) -> RenderContext {
    let last_update = case
        .last_client_update_at
        .unwrap_or(now)
        .with_timezone(&display_offset);
    RenderContext {
        client_name: client.full_name.clone(),
        client_code: client.client_code.clone(),
        case_code: case.case_code.clone(),
        status: case.current_status.label().to_string(),
        country: case.destination_country_code.clone(),
        app_type: case.application_type.label().to_string(),
        next_action: case.next_action.clone().unwrap_or_default(),
        last_update: last_update.format("%Y-%m-%d %H:%M").to_string(),
    }
}

/// Renders, logs and sends case notifications
#[derive(Clone)]
pub struct NotificationDispatcher {
    db: DatabaseConnection,
    sink: Arc<dyn NotificationSink>,
    display_offset: FixedOffset,
}

impl NotificationDispatcher {
    pub fn new(
        db: DatabaseConnection,
        sink: Arc<dyn NotificationSink>,
        display_offset: FixedOffset,
    ) -> Self {
        Self {
            db,
            sink,
            display_offset,
        }
    }

    pub fn sink(&self) -> &Arc<dyn NotificationSink> {
        &self.sink
    }

    pub async fn send_event(
        &self,
        case: &case::Model,
        client: &client::Model,
        event: NotificationEvent,
        triggered_by: Option<i64>,
    ) -> Result<message_log::Model> {
        self.send_case_update(case, client, event.template_name(), event.channel(), triggered_by)
            .await
    }

    /// Dispatch one templated message about `case`.
    ///
    /// Always returns the log row describing the attempt. `Err` only means
    /// the log itself could not be written.
    pub async fn send_case_update(
        &self,
        case: &case::Model,
        client: &client::Model,
        template_name: &str,
        channel: Channel,
        triggered_by: Option<i64>,
    ) -> Result<message_log::Model> {
        let recipient = recipient_for(client, channel);
        let base = message_log::ActiveModel {
            organization_id: Set(case.organization_id),
            client_id: Set(client.id),
            case_id: Set(Some(case.id)),
            channel: Set(channel),
            provider: Set(Some(self.sink.provider().to_string())),
            recipient: Set(recipient.clone()),
            triggered_by_id: Set(triggered_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let resolved =
            TemplateRegistry::resolve(&self.db, case.organization_id, template_name, channel)
                .await?;
        let Some(tmpl) = resolved else {
            tracing::warn!(
                case_code = %case.case_code,
                template = template_name,
                channel = %channel,
                "Template not found or inactive"
            );
            let log = message_log::ActiveModel {
                content: Set(format!("[Missing template: {} for {}]", template_name, channel)),
                status: Set(MessageStatus::Failed),
                error: Set(Some("Template not found or inactive".to_string())),
                ..base
            };
            return Ok(log.insert(&self.db).await?);
        };

        let ctx = build_render_context(case, client, self.display_offset, Utc::now());
        let (subject, body) = match render_parts(&tmpl, &ctx) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!(
                    case_code = %case.case_code,
                    template = template_name,
                    error = %e,
                    "Template render failed"
                );
                let log = message_log::ActiveModel {
                    subject: Set(tmpl.subject.clone()),
                    content: Set(tmpl.body.clone()),
                    status: Set(MessageStatus::Failed),
                    error: Set(Some(format!("Template render failed: {}", e))),
                    ..base
                };
                return Ok(log.insert(&self.db).await?);
            }
        };

        let pending = message_log::ActiveModel {
            subject: Set(subject.clone()),
            content: Set(body.clone()),
            status: Set(MessageStatus::Pending),
            ..base
        }
        .insert(&self.db)
        .await?;

        let message = OutgoingMessage {
            channel,
            recipient,
            subject,
            body,
        };
        let result = self.sink.send(&message).await;

        let mut log: message_log::ActiveModel = pending.into();
        if result.success {
            log.status = Set(MessageStatus::Sent);
            log.sent_at = Set(Some(Utc::now()));
            log.provider_message_id = Set(result.provider_message_id);
        } else {
            let error = result
                .error
                .unwrap_or_else(|| "Delivery failed".to_string());
            tracing::warn!(
                case_code = %case.case_code,
                channel = %channel,
                to = %mask_recipient(&message.recipient),
                error = %error,
                "Notification delivery failed"
            );
            log.status = Set(MessageStatus::Failed);
            log.error = Set(Some(error));
        }
        let log = log.update(&self.db).await?;

        tracing::debug!(
            log_id = log.id,
            case_code = %case.case_code,
            template = template_name,
            status = ?log.status,
            "Notification dispatched"
        );
        Ok(log)
    }

    /// Send a message that is not tied to a case template (portal passcodes)
    pub async fn send_direct(&self, message: &OutgoingMessage) -> SendResult {
        self.sink.send(message).await
    }
}

fn render_parts(
    tmpl: &message_template::Model,
    ctx: &RenderContext,
) -> std::result::Result<(Option<String>, String), TemplateError> {
    let subject = match tmpl.subject.as_deref().filter(|s| !s.is_empty()) {
        Some(subject) => Some(template::render(subject, ctx)?),
        None => None,
    };
    Ok((subject, template::render(&tmpl.body, ctx)?))
}

/// Mask a recipient for logging (privacy)
pub(crate) fn mask_recipient(recipient: &str) -> String {
    if recipient.contains('@') {
        // Email: show first 2 chars and domain
        let parts: Vec<&str> = recipient.split('@').collect();
        if parts.len() == 2 && parts[0].len() > 2 && parts[0].is_char_boundary(2) {
            format!("{}***@{}", &parts[0][..2], parts[1])
        } else {
            "***@***".to_string()
        }
    } else if recipient.starts_with('+') && recipient.is_ascii() {
        // Phone: show country code and last 2 digits
        if recipient.len() > 4 {
            format!(
                "{}***{}",
                &recipient[..3],
                &recipient[recipient.len() - 2..]
            )
        } else {
            "+***".to_string()
        }
    } else if recipient.is_empty() {
        String::new()
    } else {
        "***".to_string()
    }
}
