//! Migration: Create message_logs table

use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_organizations::Organizations;
use super::m20261001_000004_create_staff_users::StaffUsers;
use super::m20261001_000005_create_clients::Clients;
use super::m20261001_000006_create_cases::Cases;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MessageLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MessageLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MessageLogs::OrganizationId).big_integer().not_null())
                    .col(ColumnDef::new(MessageLogs::ClientId).big_integer().not_null())
                    .col(ColumnDef::new(MessageLogs::CaseId).big_integer().null())
                    .col(ColumnDef::new(MessageLogs::Channel).string_len(20).not_null())
                    .col(ColumnDef::new(MessageLogs::Provider).string_len(50).null())
                    .col(ColumnDef::new(MessageLogs::Recipient).string().not_null())
                    .col(ColumnDef::new(MessageLogs::Subject).string().null())
                    .col(ColumnDef::new(MessageLogs::Content).text().not_null())
                    .col(
                        ColumnDef::new(MessageLogs::Status)
                            .string_len(30)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(MessageLogs::ProviderMessageId)
                            .string_len(120)
                            .null(),
                    )
                    .col(ColumnDef::new(MessageLogs::Error).text().null())
                    .col(
                        ColumnDef::new(MessageLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MessageLogs::SentAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(MessageLogs::TriggeredById).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(MessageLogs::Table, MessageLogs::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MessageLogs::Table, MessageLogs::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MessageLogs::Table, MessageLogs::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MessageLogs::Table, MessageLogs::TriggeredById)
                            .to(StaffUsers::Table, StaffUsers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_message_logs_status")
                    .table(MessageLogs::Table)
                    .col(MessageLogs::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_message_logs_case")
                    .table(MessageLogs::Table)
                    .col(MessageLogs::CaseId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MessageLogs::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum MessageLogs {
    Table,
    Id,
    #[iden = "organization_id"]
    OrganizationId,
    #[iden = "client_id"]
    ClientId,
    #[iden = "case_id"]
    CaseId,
    Channel,
    Provider,
    Recipient,
    Subject,
    Content,
    Status,
    #[iden = "provider_message_id"]
    ProviderMessageId,
    Error,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "sent_at"]
    SentAt,
    #[iden = "triggered_by_id"]
    TriggeredById,
}
