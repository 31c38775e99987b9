pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_organizations;
mod m20261001_000002_create_branches;
mod m20261001_000003_create_programs;
mod m20261001_000004_create_staff_users;
mod m20261001_000005_create_clients;
mod m20261001_000006_create_cases;
mod m20261001_000007_create_status_history;
mod m20261001_000008_create_documents;
mod m20261001_000009_create_message_templates;
mod m20261001_000010_create_message_logs;
mod m20261001_000011_create_one_time_passwords;
mod m20261001_000012_create_portal_sessions;
mod m20261001_000013_create_code_sequences;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_organizations::Migration),
            Box::new(m20261001_000002_create_branches::Migration),
            Box::new(m20261001_000003_create_programs::Migration),
            Box::new(m20261001_000004_create_staff_users::Migration),
            Box::new(m20261001_000005_create_clients::Migration),
            Box::new(m20261001_000006_create_cases::Migration),
            Box::new(m20261001_000007_create_status_history::Migration),
            Box::new(m20261001_000008_create_documents::Migration),
            Box::new(m20261001_000009_create_message_templates::Migration),
            Box::new(m20261001_000010_create_message_logs::Migration),
            Box::new(m20261001_000011_create_one_time_passwords::Migration),
            Box::new(m20261001_000012_create_portal_sessions::Migration),
            Box::new(m20261001_000013_create_code_sequences::Migration),
        ]
    }
}
