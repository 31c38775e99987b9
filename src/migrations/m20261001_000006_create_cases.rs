//! Migration: Create cases table

use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_organizations::Organizations;
use super::m20261001_000002_create_branches::Branches;
use super::m20261001_000003_create_programs::Programs;
use super::m20261001_000004_create_staff_users::StaffUsers;
use super::m20261001_000005_create_clients::Clients;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cases::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cases::OrganizationId).big_integer().not_null())
                    .col(ColumnDef::new(Cases::BranchId).big_integer().null())
                    .col(ColumnDef::new(Cases::ProgramId).big_integer().null())
                    .col(
                        ColumnDef::new(Cases::CaseCode)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Cases::ClientId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Cases::DestinationCountryCode)
                            .string_len(2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cases::ApplicationType)
                            .string_len(20)
                            .not_null()
                            .default("OTHER"),
                    )
                    .col(
                        ColumnDef::new(Cases::CurrentStatus)
                            .string_len(40)
                            .not_null()
                            .default("NEW_INQUIRY"),
                    )
                    .col(
                        ColumnDef::new(Cases::Priority)
                            .string_len(10)
                            .not_null()
                            .default("NORMAL"),
                    )
                    .col(ColumnDef::new(Cases::AssignedOfficerId).big_integer().null())
                    .col(
                        ColumnDef::new(Cases::LastClientUpdateAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Cases::NextAction).string().null())
                    .col(ColumnDef::new(Cases::Notes).text().null())
                    .col(
                        ColumnDef::new(Cases::SubmittedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Cases::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Cases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Cases::Table, Cases::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Cases::Table, Cases::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Cases::Table, Cases::ProgramId)
                            .to(Programs::Table, Programs::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Cases::Table, Cases::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Cases::Table, Cases::AssignedOfficerId)
                            .to(StaffUsers::Table, StaffUsers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_cases_client", Cases::ClientId),
            ("idx_cases_status", Cases::CurrentStatus),
            ("idx_cases_priority", Cases::Priority),
            ("idx_cases_last_client_update", Cases::LastClientUpdateAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Cases::Table)
                        .col(col)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cases::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Cases {
    Table,
    Id,
    #[iden = "organization_id"]
    OrganizationId,
    #[iden = "branch_id"]
    BranchId,
    #[iden = "program_id"]
    ProgramId,
    #[iden = "case_code"]
    CaseCode,
    #[iden = "client_id"]
    ClientId,
    #[iden = "destination_country_code"]
    DestinationCountryCode,
    #[iden = "application_type"]
    ApplicationType,
    #[iden = "current_status"]
    CurrentStatus,
    Priority,
    #[iden = "assigned_officer_id"]
    AssignedOfficerId,
    #[iden = "last_client_update_at"]
    LastClientUpdateAt,
    #[iden = "next_action"]
    NextAction,
    Notes,
    #[iden = "submitted_at"]
    SubmittedAt,
    #[iden = "closed_at"]
    ClosedAt,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
