//! Test helpers and utilities for integration testing.
//!
//! Provides an in-memory database with migrations applied, fixtures for the
//! records most tests need, and notification sinks that record or fail.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use visa_crm::config::auth::AuthConfig;
use visa_crm::migrations::Migrator;
use visa_crm::models::message_template::Channel;
use visa_crm::models::{client, message_template, organization, staff_user};
use visa_crm::services::{
    create_client, NewClient, NotificationSink, OutgoingMessage, SendResult,
};
use visa_crm::state::{AppState, Settings};

pub const STAFF_TOKEN: &str = "test-staff-token";

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Create a file-backed SQLite database with a multi-connection pool
///
/// `sqlite::memory:` pins the pool to one connection, which hides write
/// lock contention between concurrent transactions.
pub async fn create_file_test_db() -> DatabaseConnection {
    let dir = std::env::temp_dir().join(format!("visa-crm-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("Failed to create test database directory");
    let url = format!("sqlite://{}?mode=rwc", dir.join("crm.db").display());

    let mut options = ConnectOptions::new(url);
    options.max_connections(10).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to create file test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Sink that keeps every message it is handed
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub sent: Arc<Mutex<Vec<OutgoingMessage>>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn provider(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &OutgoingMessage) -> SendResult {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        SendResult::sent(format!("rec-{}", sent.len()))
    }
}

/// Sink whose provider always rejects
#[derive(Clone, Default)]
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    fn provider(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, _message: &OutgoingMessage) -> SendResult {
        SendResult::failed("provider unavailable")
    }
}

/// Settings with the staff API enabled under `STAFF_TOKEN`
pub fn test_settings() -> Settings {
    Settings {
        auth: AuthConfig {
            staff_api_token: Some(STAFF_TOKEN.to_string()),
        },
        ..Default::default()
    }
}

pub fn test_state(db: DatabaseConnection, sink: Arc<dyn NotificationSink>) -> AppState {
    AppState::new(db, sink, test_settings())
}

pub async fn create_test_org(db: &DatabaseConnection, slug: &str) -> organization::Model {
    let now = Utc::now();
    organization::ActiveModel {
        name: Set(format!("{} Consulting", slug)),
        slug: Set(slug.to_string()),
        default_timezone: Set("Africa/Lagos".to_string()),
        default_language: Set("en".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create organization")
}

pub async fn create_test_template(
    db: &DatabaseConnection,
    organization_id: i64,
    name: &str,
    channel: Channel,
    subject: Option<&str>,
    body: &str,
) -> message_template::Model {
    message_template::ActiveModel {
        organization_id: Set(organization_id),
        name: Set(name.to_string()),
        channel: Set(channel),
        is_active: Set(true),
        subject: Set(subject.map(str::to_string)),
        body: Set(body.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create template")
}

/// The three templates case notifications need
pub async fn seed_case_templates(db: &DatabaseConnection, organization_id: i64) {
    create_test_template(
        db,
        organization_id,
        "CASE_STATUS_UPDATE",
        Channel::Whatsapp,
        None,
        "Hi {client_name}, case {case_code} is now {status}. Next: {next_action}",
    )
    .await;
    create_test_template(
        db,
        organization_id,
        "CASE_STATUS_UPDATE_EMAIL",
        Channel::Email,
        Some("Update on {case_code}"),
        "Dear {client_name}, your {app_type} application to {country} is now {status}.",
    )
    .await;
    create_test_template(
        db,
        organization_id,
        "SLA_REASSURANCE",
        Channel::Whatsapp,
        None,
        "Hi {client_name}, we are still working on {case_code}. Last update {last_update}.",
    )
    .await;
}

pub async fn create_test_client(
    db: &DatabaseConnection,
    organization_id: i64,
    full_name: &str,
    phone: &str,
    email: Option<&str>,
) -> client::Model {
    create_client(
        db,
        NewClient {
            organization_id,
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            email: email.map(str::to_string),
            timezone: None,
            preferred_language: None,
            source: None,
        },
    )
    .await
    .expect("Failed to create client")
}

pub async fn create_test_staff(db: &DatabaseConnection, username: &str) -> staff_user::Model {
    staff_user::ActiveModel {
        username: Set(username.to_string()),
        full_name: Set(format!("{} Officer", username)),
        email: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create staff user")
}
