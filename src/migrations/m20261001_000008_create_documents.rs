//! Migration: Create documents table

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
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::CaseId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Documents::DocType)
                            .string_len(40)
                            .not_null()
                            .default("OTHER"),
                    )
                    .col(
                        ColumnDef::new(Documents::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Documents::FilePath).string().null())
                    .col(ColumnDef::new(Documents::Description).string().null())
                    .col(ColumnDef::new(Documents::ExpiryDate).date().null())
                    .col(
                        ColumnDef::new(Documents::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Documents::UploadedById).big_integer().null())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Documents::Table, Documents::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Documents::Table, Documents::UploadedById)
                            .to(StaffUsers::Table, StaffUsers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_documents_case")
                    .table(Documents::Table)
                    .col(Documents::CaseId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    #[iden = "case_id"]
    CaseId,
    #[iden = "doc_type"]
    DocType,
    Status,
    #[iden = "file_path"]
    FilePath,
    Description,
    #[iden = "expiry_date"]
    ExpiryDate,
    Version,
    #[iden = "uploaded_by_id"]
    UploadedById,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
