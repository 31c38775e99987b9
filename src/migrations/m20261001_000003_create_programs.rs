//! Migration: Create programs table

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
                    .table(Programs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Programs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Programs::OrganizationId).big_integer().not_null())
                    .col(ColumnDef::new(Programs::Name).string().not_null())
                    .col(
                        ColumnDef::new(Programs::DestinationCountryCode)
                            .string_len(2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Programs::ApplicationType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Programs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Programs::UpdateSlaDays)
                            .integer()
                            .not_null()
                            .default(7),
                    )
                    .col(
                        ColumnDef::new(Programs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Programs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Programs::Table, Programs::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_programs_org_name_unique")
                    .table(Programs::Table)
                    .col(Programs::OrganizationId)
                    .col(Programs::Name)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Programs::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Programs {
    Table,
    Id,
    #[iden = "organization_id"]
    OrganizationId,
    Name,
    #[iden = "destination_country_code"]
    DestinationCountryCode,
    #[iden = "application_type"]
    ApplicationType,
    #[iden = "is_active"]
    IsActive,
    #[iden = "update_sla_days"]
    UpdateSlaDays,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
