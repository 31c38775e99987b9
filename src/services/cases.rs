//! Case creation and updates
//!
//! Persists what `apply_transition` decides: the case row and its history
//! row commit together, then notifications run best-effort. Their outcomes
//! are reported next to the saved case, never as the operation's error.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::codes::{allocate_code, CodeKind};
use super::notification::{NotificationDispatcher, NotificationEvent};
use super::transition::{apply_transition, ClientContact, HistoryEntry};
use crate::error::{AppError, Result};
use crate::models::case::{ApplicationType, CasePriority, CaseStatus};
use crate::models::message_log::MessageStatus;
use crate::models::prelude::*;
use crate::models::{case, client, status_history};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCase {
    /// ISO 3166-1 alpha-2, any case
    pub destination_country_code: String,
    pub application_type: ApplicationType,
    #[serde(default)]
    pub status: Option<CaseStatus>,
    #[serde(default)]
    pub priority: Option<CasePriority>,
    pub branch_id: Option<i64>,
    pub program_id: Option<i64>,
    pub assigned_officer_id: Option<i64>,
    pub next_action: Option<String>,
    pub notes: Option<String>,
}

/// Partial update. For nullable fields `null` clears and absence keeps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CasePatch {
    pub status: Option<CaseStatus>,
    pub priority: Option<CasePriority>,
    #[serde(default, deserialize_with = "double_option")]
    pub next_action: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_officer_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub branch_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub program_id: Option<Option<i64>>,
}

fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CasePatch {
    fn apply_to(&self, mut case: case::Model) -> case::Model {
        if let Some(status) = self.status {
            case.current_status = status;
        }
        if let Some(priority) = self.priority {
            case.priority = priority;
        }
        if let Some(next_action) = &self.next_action {
            case.next_action = next_action.clone().filter(|s| !s.trim().is_empty());
        }
        if let Some(notes) = &self.notes {
            case.notes = notes.clone().filter(|s| !s.trim().is_empty());
        }
        if let Some(officer) = self.assigned_officer_id {
            case.assigned_officer_id = officer;
        }
        if let Some(branch) = self.branch_id {
            case.branch_id = branch;
        }
        if let Some(program) = self.program_id {
            case.program_id = program;
        }
        case
    }
}

/// Outcome of one notification triggered by a case save
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SideEffectOutcome {
    pub event: NotificationEvent,
    pub message_log_id: Option<i64>,
    pub status: Option<MessageStatus>,
    pub error: Option<String>,
}

/// Saved case plus whatever its save caused
#[derive(Debug, Clone, Serialize)]
pub struct CaseUpdateReport {
    pub case: case::Model,
    pub history: Option<status_history::Model>,
    pub side_effects: Vec<SideEffectOutcome>,
}

/// Upper-cased two-letter country code
pub fn normalize_country_code(value: &str) -> Result<String> {
    let code = value.trim().to_ascii_uppercase();
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(code)
    } else {
        Err(AppError::BadRequest(
            "Country code must be 2 letters (ISO alpha-2), e.g. CA".to_string(),
        ))
    }
}

#[derive(Clone)]
pub struct CaseService {
    db: DatabaseConnection,
    dispatcher: NotificationDispatcher,
}

impl CaseService {
    pub fn new(db: DatabaseConnection, dispatcher: NotificationDispatcher) -> Self {
        Self { db, dispatcher }
    }

    pub async fn create_case(
        &self,
        client_id: i64,
        new: NewCase,
        actor: Option<i64>,
    ) -> Result<CaseUpdateReport> {
        self.create_case_at(client_id, new, actor, Utc::now()).await
    }

    /// Open a case for `client_id` with the next `APP-` code
    pub async fn create_case_at(
        &self,
        client_id: i64,
        new: NewCase,
        actor: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<CaseUpdateReport> {
        let country = normalize_country_code(&new.destination_country_code)?;
        let client = self.find_client(client_id).await?;

        let txn = self.db.begin().await?;
        let code = allocate_code(&txn, CodeKind::Case).await?;
        let proposed = case::Model {
            id: 0,
            organization_id: client.organization_id,
            branch_id: new.branch_id,
            program_id: new.program_id,
            case_code: code,
            client_id: client.id,
            destination_country_code: country,
            application_type: new.application_type,
            current_status: new.status.unwrap_or(CaseStatus::NewInquiry),
            priority: new.priority.unwrap_or(CasePriority::Normal),
            assigned_officer_id: new.assigned_officer_id,
            last_client_update_at: None,
            next_action: super::clients::non_blank(new.next_action),
            notes: super::clients::non_blank(new.notes),
            submitted_at: None,
            closed_at: None,
            created_at: now,
            updated_at: now,
        };

        let transition = apply_transition(None, proposed, &ClientContact::from(&client), actor, now);

        let mut row = transition.case.into_active_model().reset_all();
        row.id = sea_orm::ActiveValue::NotSet;
        let saved = row.insert(&txn).await?;
        let history = match transition.history {
            Some(entry) => Some(insert_history(&txn, saved.id, entry, now).await?),
            None => None,
        };
        txn.commit().await?;

        tracing::info!(
            case_code = %saved.case_code,
            client_code = %client.client_code,
            status = %saved.current_status,
            "Case created"
        );

        Ok(CaseUpdateReport {
            case: saved,
            history,
            side_effects: Vec::new(),
        })
    }

    pub async fn update_case(
        &self,
        case_id: i64,
        patch: CasePatch,
        actor: Option<i64>,
    ) -> Result<CaseUpdateReport> {
        self.update_case_at(case_id, patch, actor, Utc::now()).await
    }

    /// Apply `patch` to the persisted case, record any status transition and
    /// send the resulting notifications
    pub async fn update_case_at(
        &self,
        case_id: i64,
        patch: CasePatch,
        actor: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<CaseUpdateReport> {
        let txn = self.db.begin().await?;
        // touching the row first takes the write lock before anything is read
        let touched = Case::update_many()
            .col_expr(case::Column::UpdatedAt, Expr::value(now))
            .filter(case::Column::Id.eq(case_id))
            .exec(&txn)
            .await?;
        if touched.rows_affected == 0 {
            return Err(AppError::NotFound("Case not found".to_string()));
        }
        let previous = Case::find_by_id(case_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Case not found".to_string()))?;
        let client = Client::find_by_id(previous.client_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

        let proposed = patch.apply_to(previous.clone());
        let transition = apply_transition(
            Some(&previous),
            proposed,
            &ClientContact::from(&client),
            actor,
            now,
        );

        let mut updated = transition.case;
        updated.updated_at = now;
        let saved = updated.into_active_model().reset_all().update(&txn).await?;
        let history = match transition.history {
            Some(entry) => Some(insert_history(&txn, saved.id, entry, now).await?),
            None => None,
        };
        txn.commit().await?;

        if let Some(h) = &history {
            tracing::info!(
                case_code = %saved.case_code,
                from = %h.old_status,
                to = %h.new_status,
                "Case status changed"
            );
        }

        let mut side_effects = Vec::with_capacity(transition.notifications.len());
        for request in transition.notifications {
            let outcome = match self
                .dispatcher
                .send_event(&saved, &client, request.event, request.triggered_by)
                .await
            {
                Ok(log) => SideEffectOutcome {
                    event: request.event,
                    message_log_id: Some(log.id),
                    status: Some(log.status),
                    error: log.error,
                },
                Err(e) => {
                    tracing::error!(
                        case_code = %saved.case_code,
                        event = %request.event,
                        error = %e,
                        "Notification dispatch failed"
                    );
                    SideEffectOutcome {
                        event: request.event,
                        message_log_id: None,
                        status: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            side_effects.push(outcome);
        }

        Ok(CaseUpdateReport {
            case: saved,
            history,
            side_effects,
        })
    }

    async fn find_client(&self, client_id: i64) -> Result<client::Model> {
        Client::find_by_id(client_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
    }
}

async fn insert_history<C: sea_orm::ConnectionTrait>(
    conn: &C,
    case_id: i64,
    entry: HistoryEntry,
    now: DateTime<Utc>,
) -> Result<status_history::Model> {
    let row = status_history::ActiveModel {
        case_id: Set(case_id),
        old_status: Set(entry.old_status),
        new_status: Set(entry.new_status),
        changed_by_id: Set(entry.changed_by_id),
        changed_at: Set(now),
        comment: Set(Some(entry.comment)),
        ..Default::default()
    };
    Ok(row.insert(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_normalized() {
        assert_eq!(normalize_country_code(" ca ").unwrap(), "CA");
        assert!(normalize_country_code("CAN").is_err());
        assert!(normalize_country_code("C1").is_err());
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let patch: CasePatch =
            serde_json::from_str(r#"{"next_action": null, "status": "DOCS_RECEIVED"}"#).unwrap();
        assert_eq!(patch.next_action, Some(None));
        assert_eq!(patch.notes, None);
        assert_eq!(patch.status, Some(CaseStatus::DocsReceived));
    }
}
