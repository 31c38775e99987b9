//! Migration: Create clients table

use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_organizations::Organizations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::OrganizationId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Clients::ClientCode)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Clients::FullName).string().not_null())
                    .col(ColumnDef::new(Clients::PhoneE164).string_len(30).not_null())
                    .col(ColumnDef::new(Clients::Email).string().null())
                    .col(
                        ColumnDef::new(Clients::Timezone)
                            .string()
                            .not_null()
                            .default("Africa/Lagos"),
                    )
                    .col(
                        ColumnDef::new(Clients::PreferredLanguage)
                            .string()
                            .not_null()
                            .default("en"),
                    )
                    .col(ColumnDef::new(Clients::Source).string().null())
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Clients::Table, Clients::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_phone")
                    .table(Clients::Table)
                    .col(Clients::PhoneE164)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clients::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Clients {
    Table,
    Id,
    #[iden = "organization_id"]
    OrganizationId,
    #[iden = "client_code"]
    ClientCode,
    #[iden = "full_name"]
    FullName,
    #[iden = "phone_e164"]
    PhoneE164,
    Email,
    Timezone,
    #[iden = "preferred_language"]
    PreferredLanguage,
    Source,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
