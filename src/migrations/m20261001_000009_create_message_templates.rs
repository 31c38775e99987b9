//! Migration: Create message_templates table

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
                    .table(MessageTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MessageTemplates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MessageTemplates::OrganizationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MessageTemplates::Name).string_len(120).not_null())
                    .col(ColumnDef::new(MessageTemplates::Channel).string_len(20).not_null())
                    .col(
                        ColumnDef::new(MessageTemplates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(MessageTemplates::Subject).string().null())
                    .col(ColumnDef::new(MessageTemplates::Body).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(MessageTemplates::Table, MessageTemplates::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_message_templates_unique")
                    .table(MessageTemplates::Table)
                    .col(MessageTemplates::OrganizationId)
                    .col(MessageTemplates::Name)
                    .col(MessageTemplates::Channel)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(MessageTemplates::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum MessageTemplates {
    Table,
    Id,
    #[iden = "organization_id"]
    OrganizationId,
    Name,
    Channel,
    #[iden = "is_active"]
    IsActive,
    Subject,
    Body,
}
