//! Event to template mapping and the configuration check run at startup

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::message_template::Channel;
use crate::models::prelude::*;

/// Notifications the system knows how to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    CaseStatusUpdate,
    CaseStatusUpdateEmail,
    SlaReassurance,
}

impl NotificationEvent {
    pub fn template_name(&self) -> &'static str {
        match self {
            NotificationEvent::CaseStatusUpdate => "CASE_STATUS_UPDATE",
            NotificationEvent::CaseStatusUpdateEmail => "CASE_STATUS_UPDATE_EMAIL",
            NotificationEvent::SlaReassurance => "SLA_REASSURANCE",
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            NotificationEvent::CaseStatusUpdate => Channel::Whatsapp,
            NotificationEvent::CaseStatusUpdateEmail => Channel::Email,
            NotificationEvent::SlaReassurance => Channel::Whatsapp,
        }
    }

    pub fn all() -> Vec<NotificationEvent> {
        vec![
            NotificationEvent::CaseStatusUpdate,
            NotificationEvent::CaseStatusUpdateEmail,
            NotificationEvent::SlaReassurance,
        ]
    }
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.template_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MissingTemplate {
    pub event: NotificationEvent,
    pub template_name: String,
    pub channel: Channel,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegistryReport {
    pub organization_id: i64,
    pub ok: bool,
    pub missing: Vec<MissingTemplate>,
}

/// Resolves templates by (organization, name, channel)
pub struct TemplateRegistry;

impl TemplateRegistry {
    /// Active template for the exact key, if any
    pub async fn resolve<C: ConnectionTrait>(
        db: &C,
        organization_id: i64,
        name: &str,
        channel: Channel,
    ) -> Result<Option<message_template::Model>> {
        let template = MessageTemplate::find()
            .filter(message_template::Column::OrganizationId.eq(organization_id))
            .filter(message_template::Column::Name.eq(name))
            .filter(message_template::Column::Channel.eq(channel))
            .filter(message_template::Column::IsActive.eq(true))
            .one(db)
            .await?;
        Ok(template)
    }

    /// Report which events have no active template for `organization_id`
    pub async fn check<C: ConnectionTrait>(db: &C, organization_id: i64) -> Result<RegistryReport> {
        let mut missing = Vec::new();
        for event in NotificationEvent::all() {
            let found =
                Self::resolve(db, organization_id, event.template_name(), event.channel()).await?;
            if found.is_none() {
                missing.push(MissingTemplate {
                    event,
                    template_name: event.template_name().to_string(),
                    channel: event.channel(),
                });
            }
        }
        Ok(RegistryReport {
            organization_id,
            ok: missing.is_empty(),
            missing,
        })
    }

    /// Run `check` for every organization and log what is missing
    pub async fn check_all<C: ConnectionTrait>(db: &C) -> Result<Vec<RegistryReport>> {
        let organizations = Organization::find().all(db).await?;
        let mut reports = Vec::with_capacity(organizations.len());
        for org in organizations {
            let report = Self::check(db, org.id).await?;
            for gap in &report.missing {
                tracing::warn!(
                    organization = %org.slug,
                    template = %gap.template_name,
                    channel = %gap.channel,
                    "No active template configured; these notifications will be logged as FAILED"
                );
            }
            reports.push(report);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_keys() {
        assert_eq!(
            NotificationEvent::CaseStatusUpdate.template_name(),
            "CASE_STATUS_UPDATE"
        );
        assert_eq!(
            NotificationEvent::CaseStatusUpdateEmail.channel(),
            Channel::Email
        );
        assert_eq!(NotificationEvent::SlaReassurance.channel(), Channel::Whatsapp);
        assert_eq!(NotificationEvent::all().len(), 3);
    }
}
