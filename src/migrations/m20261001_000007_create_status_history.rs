//! Migration: Create status_history table

use sea_orm_migration::prelude::*;

use super::m20261001_000004_create_staff_users::StaffUsers;
use super::m20261001_000006_create_cases::Cases;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StatusHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StatusHistory::CaseId).big_integer().not_null())
                    .col(ColumnDef::new(StatusHistory::OldStatus).string_len(40).not_null())
                    .col(ColumnDef::new(StatusHistory::NewStatus).string_len(40).not_null())
                    .col(ColumnDef::new(StatusHistory::ChangedById).big_integer().null())
                    .col(
                        ColumnDef::new(StatusHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StatusHistory::Comment).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(StatusHistory::Table, StatusHistory::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StatusHistory::Table, StatusHistory::ChangedById)
                            .to(StaffUsers::Table, StaffUsers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_status_history_case_changed")
                    .table(StatusHistory::Table)
                    .col(StatusHistory::CaseId)
                    .col(StatusHistory::ChangedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StatusHistory::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum StatusHistory {
    Table,
    Id,
    #[iden = "case_id"]
    CaseId,
    #[iden = "old_status"]
    OldStatus,
    #[iden = "new_status"]
    NewStatus,
    #[iden = "changed_by_id"]
    ChangedById,
    #[iden = "changed_at"]
    ChangedAt,
    Comment,
}
