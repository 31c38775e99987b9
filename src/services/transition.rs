//! Case status transitions as a pure function
//!
//! `apply_transition` compares the persisted case with the proposed one and
//! decides which history row to append and which notifications to send.
//! Any status may move to any other; there is no adjacency graph.

use chrono::{DateTime, Utc};

use crate::models::case::{self, CaseStatus};
use crate::models::client;

use super::notification::NotificationEvent;

/// Snapshot of a case's columns
pub type CaseState = case::Model;

pub const CREATED_COMMENT: &str = "Case created";
pub const STATUS_UPDATED_COMMENT: &str = "Status updated";

/// What the engine needs to know about the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContact {
    pub email: Option<String>,
}

impl ClientContact {
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

impl From<&client::Model> for ClientContact {
    fn from(client: &client::Model) -> Self {
        Self {
            email: client.contact_email().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub old_status: CaseStatus,
    pub new_status: CaseStatus,
    pub changed_by_id: Option<i64>,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationRequest {
    pub event: NotificationEvent,
    pub triggered_by: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub case: CaseState,
    pub history: Option<HistoryEntry>,
    pub notifications: Vec<NotificationRequest>,
}

/// Decide the effects of saving `proposed` over `previous`.
///
/// `previous == None` means the case is being created. The acting staff
/// member is recorded on the history row; without one the assigned officer
/// is used.
pub fn apply_transition(
    previous: Option<&CaseState>,
    mut proposed: CaseState,
    client: &ClientContact,
    actor: Option<i64>,
    now: DateTime<Utc>,
) -> Transition {
    let changed_by = actor.or(proposed.assigned_officer_id);

    let Some(previous) = previous else {
        let status = proposed.current_status;
        proposed.last_client_update_at = Some(now);
        stamp_milestones(&mut proposed, now);
        return Transition {
            case: proposed,
            history: Some(HistoryEntry {
                old_status: status,
                new_status: status,
                changed_by_id: changed_by,
                comment: CREATED_COMMENT.to_string(),
            }),
            notifications: Vec::new(),
        };
    };

    // identity columns never change after creation
    proposed.id = previous.id;
    proposed.case_code = previous.case_code.clone();
    proposed.client_id = previous.client_id;
    proposed.organization_id = previous.organization_id;
    proposed.created_at = previous.created_at;

    if previous.current_status == proposed.current_status {
        return Transition {
            case: proposed,
            history: None,
            notifications: Vec::new(),
        };
    }

    proposed.last_client_update_at = Some(now);
    stamp_milestones(&mut proposed, now);

    let mut notifications = vec![NotificationRequest {
        event: NotificationEvent::CaseStatusUpdate,
        triggered_by: changed_by,
    }];
    if client.has_email() {
        notifications.push(NotificationRequest {
            event: NotificationEvent::CaseStatusUpdateEmail,
            triggered_by: changed_by,
        });
    }

    Transition {
        history: Some(HistoryEntry {
            old_status: previous.current_status,
            new_status: proposed.current_status,
            changed_by_id: changed_by,
            comment: STATUS_UPDATED_COMMENT.to_string(),
        }),
        case: proposed,
        notifications,
    }
}

fn stamp_milestones(case: &mut CaseState, now: DateTime<Utc>) {
    if case.current_status == CaseStatus::ApplicationSubmitted && case.submitted_at.is_none() {
        case.submitted_at = Some(now);
    }
    if case.current_status.is_terminal() && case.closed_at.is_none() {
        case.closed_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::case::{ApplicationType, CasePriority};
    use chrono::Duration;

    fn state(status: CaseStatus) -> CaseState {
        let created = Utc::now() - Duration::days(3);
        case::Model {
            id: 7,
            organization_id: 1,
            branch_id: None,
            program_id: None,
            case_code: "APP-0007".to_string(),
            client_id: 3,
            destination_country_code: "CA".to_string(),
            application_type: ApplicationType::Study,
            current_status: status,
            priority: CasePriority::Normal,
            assigned_officer_id: Some(11),
            last_client_update_at: Some(created),
            next_action: None,
            notes: None,
            submitted_at: None,
            closed_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn with_email() -> ClientContact {
        ClientContact {
            email: Some("a@b.com".to_string()),
        }
    }

    #[test]
    fn test_creation_writes_history_without_notifying() {
        let now = Utc::now();
        let t = apply_transition(None, state(CaseStatus::NewInquiry), &with_email(), None, now);

        let history = t.history.unwrap();
        assert_eq!(history.old_status, CaseStatus::NewInquiry);
        assert_eq!(history.new_status, CaseStatus::NewInquiry);
        assert_eq!(history.comment, "Case created");
        assert_eq!(history.changed_by_id, Some(11));
        assert_eq!(t.case.last_client_update_at, Some(now));
        assert!(t.notifications.is_empty());
    }

    #[test]
    fn test_unchanged_status_is_silent() {
        let previous = state(CaseStatus::DocsRequested);
        let mut proposed = previous.clone();
        proposed.notes = Some("called client".to_string());

        let t = apply_transition(Some(&previous), proposed, &with_email(), None, Utc::now());

        assert!(t.history.is_none());
        assert!(t.notifications.is_empty());
        assert_eq!(t.case.last_client_update_at, previous.last_client_update_at);
        assert_eq!(t.case.notes.as_deref(), Some("called client"));
    }

    #[test]
    fn test_status_change_notifies_both_channels_when_email_present() {
        let now = Utc::now();
        let previous = state(CaseStatus::DocsRequested);
        let mut proposed = previous.clone();
        proposed.current_status = CaseStatus::DocsReceived;

        let t = apply_transition(Some(&previous), proposed, &with_email(), Some(5), now);

        let history = t.history.unwrap();
        assert_eq!(history.old_status, CaseStatus::DocsRequested);
        assert_eq!(history.new_status, CaseStatus::DocsReceived);
        assert_eq!(history.comment, "Status updated");
        assert_eq!(history.changed_by_id, Some(5));
        assert_eq!(t.case.last_client_update_at, Some(now));
        let events: Vec<_> = t.notifications.iter().map(|n| n.event).collect();
        assert_eq!(
            events,
            vec![
                NotificationEvent::CaseStatusUpdate,
                NotificationEvent::CaseStatusUpdateEmail
            ]
        );
    }

    #[test]
    fn test_blank_email_gets_whatsapp_only() {
        let previous = state(CaseStatus::NewInquiry);
        let mut proposed = previous.clone();
        proposed.current_status = CaseStatus::ConsultationCompleted;
        let contact = ClientContact {
            email: Some("   ".to_string()),
        };

        let t = apply_transition(Some(&previous), proposed, &contact, None, Utc::now());

        assert_eq!(t.notifications.len(), 1);
        assert_eq!(t.notifications[0].event, NotificationEvent::CaseStatusUpdate);
    }

    #[test]
    fn test_any_status_may_follow_any_other() {
        let previous = state(CaseStatus::Closed);
        let mut proposed = previous.clone();
        proposed.current_status = CaseStatus::NewInquiry;

        let t = apply_transition(Some(&previous), proposed, &ClientContact::default(), None, Utc::now());

        assert!(t.history.is_some());
    }

    #[test]
    fn test_milestones_are_stamped_once() {
        let now = Utc::now();
        let previous = state(CaseStatus::DocsReceived);
        let mut proposed = previous.clone();
        proposed.current_status = CaseStatus::ApplicationSubmitted;
        let t = apply_transition(Some(&previous), proposed, &ClientContact::default(), None, now);
        assert_eq!(t.case.submitted_at, Some(now));
        assert_eq!(t.case.closed_at, None);

        let later = now + Duration::hours(1);
        let mut refused = t.case.clone();
        refused.current_status = CaseStatus::Refused;
        let t2 = apply_transition(Some(&t.case), refused, &ClientContact::default(), None, later);
        assert_eq!(t2.case.submitted_at, Some(now));
        assert_eq!(t2.case.closed_at, Some(later));
    }

    #[test]
    fn test_case_code_cannot_be_rewritten() {
        let previous = state(CaseStatus::NewInquiry);
        let mut proposed = previous.clone();
        proposed.case_code = "APP-9999".to_string();

        let t = apply_transition(Some(&previous), proposed, &ClientContact::default(), None, Utc::now());

        assert_eq!(t.case.case_code, "APP-0007");
    }
}
