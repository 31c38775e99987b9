//! Case saves: status history, client-update stamp and notifications
//!
//! Covers:
//! - creation writes exactly one history row and sends nothing
//! - saving without a status change is a no-op for history and messages
//! - a status change notifies on WhatsApp, plus email when the client has one
//! - a delivery failure never rolls back the saved case
//! - concurrent saves on a pooled database all commit

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

mod common;
use common::{
    create_file_test_db, create_test_client, create_test_db, create_test_org, create_test_staff,
    seed_case_templates, test_state, FailingSink, RecordingSink,
};

use visa_crm::models::case::{ApplicationType, CaseStatus};
use visa_crm::models::message_log::MessageStatus;
use visa_crm::models::message_template::Channel;
use visa_crm::models::prelude::*;
use visa_crm::models::{code_sequence, message_log, status_history};
use visa_crm::services::{CasePatch, NewCase, NotificationEvent};

fn new_case(status: Option<CaseStatus>) -> NewCase {
    NewCase {
        destination_country_code: "CA".to_string(),
        application_type: ApplicationType::Study,
        status,
        priority: None,
        branch_id: None,
        program_id: None,
        assigned_officer_id: None,
        next_action: Some("Upload passport".to_string()),
        notes: None,
    }
}

fn status_patch(status: CaseStatus) -> CasePatch {
    CasePatch {
        status: Some(status),
        ..Default::default()
    }
}

async fn history_count(db: &sea_orm::DatabaseConnection, case_id: i64) -> u64 {
    StatusHistory::find()
        .filter(status_history::Column::CaseId.eq(case_id))
        .count(db)
        .await
        .unwrap()
}

async fn logs_for(db: &sea_orm::DatabaseConnection, case_id: i64) -> Vec<message_log::Model> {
    MessageLog::find()
        .filter(message_log::Column::CaseId.eq(case_id))
        .all(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_creation_records_initial_history() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let sink = RecordingSink::default();
    let state = test_state(db.clone(), Arc::new(sink.clone()));
    let client = create_test_client(&db, org.id, "Ada Obi", "+2348012345678", None).await;

    let report = state
        .cases
        .create_case(client.id, new_case(None), None)
        .await
        .unwrap();

    let history = report.history.unwrap();
    assert_eq!(history.old_status, CaseStatus::NewInquiry);
    assert_eq!(history.new_status, CaseStatus::NewInquiry);
    assert_eq!(history.comment.as_deref(), Some("Case created"));
    assert!(report.case.last_client_update_at.is_some());
    assert!(report.side_effects.is_empty());
    assert_eq!(history_count(&db, report.case.id).await, 1);
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn test_save_without_status_change_is_noop() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let sink = RecordingSink::default();
    let state = test_state(db.clone(), Arc::new(sink.clone()));
    let client =
        create_test_client(&db, org.id, "Ada Obi", "+2348012345678", Some("a@b.com")).await;
    let created = state
        .cases
        .create_case(client.id, new_case(None), None)
        .await
        .unwrap();
    let stamped = created.case.last_client_update_at;

    let patch = CasePatch {
        notes: Some(Some("Called client".to_string())),
        ..Default::default()
    };
    let later = Utc::now() + Duration::hours(2);
    let report = state
        .cases
        .update_case_at(created.case.id, patch, None, later)
        .await
        .unwrap();

    assert!(report.history.is_none());
    assert!(report.side_effects.is_empty());
    assert_eq!(report.case.notes.as_deref(), Some("Called client"));
    assert_eq!(report.case.last_client_update_at, stamped);
    assert_eq!(history_count(&db, created.case.id).await, 1);
    assert!(logs_for(&db, created.case.id).await.is_empty());
}

#[tokio::test]
async fn test_status_change_without_email_sends_whatsapp_only() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let sink = RecordingSink::default();
    let state = test_state(db.clone(), Arc::new(sink.clone()));
    let client = create_test_client(&db, org.id, "Ada Obi", "+2348012345678", None).await;
    let created = state
        .cases
        .create_case(client.id, new_case(None), None)
        .await
        .unwrap();

    let report = state
        .cases
        .update_case(created.case.id, status_patch(CaseStatus::DocsRequested), None)
        .await
        .unwrap();

    assert_eq!(report.side_effects.len(), 1);
    assert_eq!(report.side_effects[0].event, NotificationEvent::CaseStatusUpdate);
    assert_eq!(report.side_effects[0].status, Some(MessageStatus::Sent));

    let sent = sink.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel, Channel::Whatsapp);
    assert_eq!(sent[0].recipient, "+2348012345678");
    assert!(sent[0].body.contains("Documents Requested"));
}

#[tokio::test]
async fn test_docs_received_scenario() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let sink = RecordingSink::default();
    let state = test_state(db.clone(), Arc::new(sink.clone()));
    let officer = create_test_staff(&db, "officer").await;
    let client =
        create_test_client(&db, org.id, "Ada Obi", "+2348012345678", Some("a@b.com")).await;

    // six cases were opened before this one
    code_sequence::ActiveModel {
        prefix: Set("APP".to_string()),
        last_value: Set(6),
    }
    .insert(&db)
    .await
    .unwrap();

    let created = state
        .cases
        .create_case(client.id, new_case(Some(CaseStatus::DocsRequested)), None)
        .await
        .unwrap();
    assert_eq!(created.case.case_code, "APP-0007");

    let now = Utc::now() + Duration::days(3);
    let report = state
        .cases
        .update_case_at(
            created.case.id,
            status_patch(CaseStatus::DocsReceived),
            Some(officer.id),
            now,
        )
        .await
        .unwrap();

    let history = report.history.unwrap();
    assert_eq!(history.old_status, CaseStatus::DocsRequested);
    assert_eq!(history.new_status, CaseStatus::DocsReceived);
    assert_eq!(history.changed_by_id, Some(officer.id));
    assert_eq!(history_count(&db, created.case.id).await, 2);
    assert_eq!(report.case.last_client_update_at, Some(now));

    let logs = logs_for(&db, created.case.id).await;
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.status == MessageStatus::Sent));
    assert!(logs.iter().all(|l| l.triggered_by_id == Some(officer.id)));

    let whatsapp = logs.iter().find(|l| l.channel == Channel::Whatsapp).unwrap();
    assert_eq!(whatsapp.recipient, "+2348012345678");
    assert!(whatsapp.content.contains("APP-0007"));

    let email = logs.iter().find(|l| l.channel == Channel::Email).unwrap();
    assert_eq!(email.recipient, "a@b.com");
    assert_eq!(email.subject.as_deref(), Some("Update on APP-0007"));
    assert!(email.content.contains("Documents Received"));
}

#[tokio::test]
async fn test_history_falls_back_to_assigned_officer() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let state = test_state(db.clone(), Arc::new(RecordingSink::default()));
    let officer = create_test_staff(&db, "officer").await;
    let client = create_test_client(&db, org.id, "Ada Obi", "+2348012345678", None).await;

    let mut new = new_case(None);
    new.assigned_officer_id = Some(officer.id);
    let created = state.cases.create_case(client.id, new, None).await.unwrap();
    assert_eq!(created.history.unwrap().changed_by_id, Some(officer.id));

    let report = state
        .cases
        .update_case(created.case.id, status_patch(CaseStatus::ConsultationCompleted), None)
        .await
        .unwrap();
    assert_eq!(report.history.unwrap().changed_by_id, Some(officer.id));
}

#[tokio::test]
async fn test_milestones_are_stamped() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let state = test_state(db.clone(), Arc::new(RecordingSink::default()));
    let client = create_test_client(&db, org.id, "Ada Obi", "+2348012345678", None).await;
    let created = state
        .cases
        .create_case(client.id, new_case(None), None)
        .await
        .unwrap();

    let submitted = state
        .cases
        .update_case(created.case.id, status_patch(CaseStatus::ApplicationSubmitted), None)
        .await
        .unwrap();
    assert!(submitted.case.submitted_at.is_some());
    assert!(submitted.case.closed_at.is_none());

    let approved = state
        .cases
        .update_case(created.case.id, status_patch(CaseStatus::Approved), None)
        .await
        .unwrap();
    assert!(approved.case.closed_at.is_some());
    assert_eq!(approved.case.submitted_at, submitted.case.submitted_at);
}

#[tokio::test]
async fn test_delivery_failure_keeps_status_change() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let state = test_state(db.clone(), Arc::new(FailingSink));
    let client =
        create_test_client(&db, org.id, "Ada Obi", "+2348012345678", Some("a@b.com")).await;
    let created = state
        .cases
        .create_case(client.id, new_case(None), None)
        .await
        .unwrap();

    let report = state
        .cases
        .update_case(created.case.id, status_patch(CaseStatus::EmbassyReview), None)
        .await
        .unwrap();

    assert_eq!(report.case.current_status, CaseStatus::EmbassyReview);
    assert_eq!(report.side_effects.len(), 2);
    for outcome in &report.side_effects {
        assert_eq!(outcome.status, Some(MessageStatus::Failed));
        assert_eq!(outcome.error.as_deref(), Some("provider unavailable"));
    }

    let stored = Case::find_by_id(created.case.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.current_status, CaseStatus::EmbassyReview);
    assert_eq!(history_count(&db, created.case.id).await, 2);
}

#[tokio::test]
async fn test_history_counts_only_status_changes_across_saves() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let state = test_state(db.clone(), Arc::new(RecordingSink::default()));
    let client = create_test_client(&db, org.id, "Ada Obi", "+2348012345678", None).await;
    let created = state
        .cases
        .create_case(client.id, new_case(None), None)
        .await
        .unwrap();
    let id = created.case.id;

    let first = state
        .cases
        .update_case(id, status_patch(CaseStatus::DocsRequested), None)
        .await
        .unwrap();
    assert!(first.history.is_some());

    let notes_only = CasePatch {
        notes: Some(Some("Passport copy pending".to_string())),
        ..Default::default()
    };
    let second = state.cases.update_case(id, notes_only, None).await.unwrap();
    assert!(second.history.is_none());

    let repeated = state
        .cases
        .update_case(id, status_patch(CaseStatus::DocsRequested), None)
        .await
        .unwrap();
    assert!(repeated.history.is_none());
    assert!(repeated.side_effects.is_empty());

    let last = state
        .cases
        .update_case(id, status_patch(CaseStatus::DocsReceived), None)
        .await
        .unwrap();
    assert!(last.history.is_some());

    let rows = StatusHistory::find()
        .filter(status_history::Column::CaseId.eq(id))
        .order_by_asc(status_history::Column::Id)
        .all(&db)
        .await
        .unwrap();
    let steps: Vec<_> = rows.iter().map(|r| (r.old_status, r.new_status)).collect();
    assert_eq!(
        steps,
        vec![
            (CaseStatus::NewInquiry, CaseStatus::NewInquiry),
            (CaseStatus::NewInquiry, CaseStatus::DocsRequested),
            (CaseStatus::DocsRequested, CaseStatus::DocsReceived),
        ]
    );
}

#[tokio::test]
async fn test_concurrent_status_updates_all_commit() {
    let db = create_file_test_db().await;
    let org = create_test_org(&db, "acme").await;
    let state = test_state(db.clone(), Arc::new(RecordingSink::default()));

    let mut case_ids = Vec::new();
    for i in 0..10 {
        let phone = format!("+23480123456{:02}", i);
        let client = create_test_client(&db, org.id, &format!("Client {}", i), &phone, None).await;
        let created = state
            .cases
            .create_case(client.id, new_case(None), None)
            .await
            .unwrap();
        case_ids.push(created.case.id);
    }

    let mut handles = Vec::new();
    for id in case_ids.clone() {
        let cases = state.cases.clone();
        handles.push(tokio::spawn(async move {
            cases
                .update_case(id, status_patch(CaseStatus::DocsRequested), None)
                .await
        }));
    }
    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.case.current_status, CaseStatus::DocsRequested);
    }

    for id in case_ids {
        assert_eq!(history_count(&db, id).await, 2);
    }
}

#[tokio::test]
async fn test_update_missing_case_is_not_found() {
    let db = create_test_db().await;
    let state = test_state(db, Arc::new(RecordingSink::default()));

    let err = state
        .cases
        .update_case(999, status_patch(CaseStatus::Closed), None)
        .await
        .unwrap_err();

    assert!(matches!(err, visa_crm::error::AppError::NotFound(_)));
}
