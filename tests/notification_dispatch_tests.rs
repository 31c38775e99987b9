//! Templated case notifications and their message logs
//!
//! Covers:
//! - missing or inactive templates produce a FAILED log without sending
//! - render failures produce a FAILED log naming the problem
//! - provider failures and successes land in the log status
//! - the template registry report lists missing event templates

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel, Set};

mod common;
use common::{
    create_test_client, create_test_db, create_test_org, create_test_template,
    seed_case_templates, test_state, FailingSink, RecordingSink,
};

use visa_crm::models::case::{self, ApplicationType};
use visa_crm::models::client;
use visa_crm::models::message_log::MessageStatus;
use visa_crm::models::message_template::Channel;
use visa_crm::services::{NewCase, NotificationEvent, TemplateRegistry};
use visa_crm::state::AppState;

async fn setup_case(
    db: &DatabaseConnection,
    state: &AppState,
    org_id: i64,
) -> (case::Model, client::Model) {
    let client =
        create_test_client(db, org_id, "Ada Obi", "+2348012345678", Some("a@b.com")).await;
    let report = state
        .cases
        .create_case(
            client.id,
            NewCase {
                destination_country_code: "GB".to_string(),
                application_type: ApplicationType::Visit,
                status: None,
                priority: None,
                branch_id: None,
                program_id: None,
                assigned_officer_id: None,
                next_action: None,
                notes: None,
            },
            None,
        )
        .await
        .unwrap();
    (report.case, client)
}

#[tokio::test]
async fn test_missing_template_logs_failure() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    let sink = RecordingSink::default();
    let state = test_state(db.clone(), Arc::new(sink.clone()));
    let (case, client) = setup_case(&db, &state, org.id).await;

    let log = state
        .notifier
        .send_event(&case, &client, NotificationEvent::CaseStatusUpdate, None)
        .await
        .unwrap();

    assert_eq!(log.status, MessageStatus::Failed);
    assert_eq!(log.error.as_deref(), Some("Template not found or inactive"));
    assert_eq!(log.content, "[Missing template: CASE_STATUS_UPDATE for WHATSAPP]");
    assert_eq!(log.case_id, Some(case.id));
    assert!(log.sent_at.is_none());
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn test_inactive_template_is_treated_as_missing() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    let tmpl = create_test_template(
        &db,
        org.id,
        "CASE_STATUS_UPDATE",
        Channel::Whatsapp,
        None,
        "Hi {client_name}",
    )
    .await;
    let mut inactive = tmpl.into_active_model();
    inactive.is_active = Set(false);
    inactive.update(&db).await.unwrap();

    let state = test_state(db.clone(), Arc::new(RecordingSink::default()));
    let (case, client) = setup_case(&db, &state, org.id).await;

    let log = state
        .notifier
        .send_event(&case, &client, NotificationEvent::CaseStatusUpdate, None)
        .await
        .unwrap();

    assert_eq!(log.status, MessageStatus::Failed);
    assert_eq!(log.error.as_deref(), Some("Template not found or inactive"));
}

#[tokio::test]
async fn test_unknown_placeholder_fails_render() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    create_test_template(
        &db,
        org.id,
        "CASE_STATUS_UPDATE",
        Channel::Whatsapp,
        None,
        "Hi {client_name}, your passport number is {passport_no}",
    )
    .await;
    let sink = RecordingSink::default();
    let state = test_state(db.clone(), Arc::new(sink.clone()));
    let (case, client) = setup_case(&db, &state, org.id).await;

    let log = state
        .notifier
        .send_event(&case, &client, NotificationEvent::CaseStatusUpdate, None)
        .await
        .unwrap();

    assert_eq!(log.status, MessageStatus::Failed);
    let error = log.error.unwrap();
    assert!(error.starts_with("Template render failed"));
    assert!(error.contains("passport_no"));
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn test_successful_send_is_logged_as_sent() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let sink = RecordingSink::default();
    let state = test_state(db.clone(), Arc::new(sink.clone()));
    let (case, client) = setup_case(&db, &state, org.id).await;

    let log = state
        .notifier
        .send_event(&case, &client, NotificationEvent::CaseStatusUpdateEmail, None)
        .await
        .unwrap();

    assert_eq!(log.status, MessageStatus::Sent);
    assert!(log.sent_at.is_some());
    assert_eq!(log.provider.as_deref(), Some("recording"));
    assert_eq!(log.provider_message_id.as_deref(), Some("rec-1"));
    assert_eq!(log.recipient, "a@b.com");
    assert_eq!(
        log.content,
        "Dear Ada Obi, your Visit/Tourism application to GB is now New Inquiry."
    );

    let sent = sink.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject.as_deref(), Some(format!("Update on {}", case.case_code).as_str()));
}

#[tokio::test]
async fn test_provider_failure_is_logged_as_failed() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    seed_case_templates(&db, org.id).await;
    let state = test_state(db.clone(), Arc::new(FailingSink));
    let (case, client) = setup_case(&db, &state, org.id).await;

    let log = state
        .notifier
        .send_event(&case, &client, NotificationEvent::CaseStatusUpdate, None)
        .await
        .unwrap();

    assert_eq!(log.status, MessageStatus::Failed);
    assert_eq!(log.error.as_deref(), Some("provider unavailable"));
    assert!(log.sent_at.is_none());
    assert!(log.content.contains("Ada Obi"));
}

#[tokio::test]
async fn test_registry_reports_missing_templates() {
    let db = create_test_db().await;
    let org = create_test_org(&db, "acme").await;
    create_test_template(
        &db,
        org.id,
        "CASE_STATUS_UPDATE",
        Channel::Whatsapp,
        None,
        "Hi {client_name}",
    )
    .await;

    let report = TemplateRegistry::check(&db, org.id).await.unwrap();
    assert!(!report.ok);
    let missing: Vec<&str> = report.missing.iter().map(|m| m.template_name.as_str()).collect();
    assert!(missing.contains(&"CASE_STATUS_UPDATE_EMAIL"));
    assert!(missing.contains(&"SLA_REASSURANCE"));
    assert!(!missing.contains(&"CASE_STATUS_UPDATE"));

    create_test_template(
        &db,
        org.id,
        "CASE_STATUS_UPDATE_EMAIL",
        Channel::Email,
        Some("Update"),
        "Dear {client_name}",
    )
    .await;
    create_test_template(
        &db,
        org.id,
        "SLA_REASSURANCE",
        Channel::Whatsapp,
        None,
        "Still on it, {client_name}",
    )
    .await;
    let report = TemplateRegistry::check(&db, org.id).await.unwrap();
    assert!(report.ok);
    assert!(report.missing.is_empty());
}
