//! Migration: Create portal_sessions table

use sea_orm_migration::prelude::*;

use super::m20261001_000005_create_clients::Clients;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PortalSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PortalSessions::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PortalSessions::PortalClientCode).string_len(20).null())
                    .col(ColumnDef::new(PortalSessions::PortalPhone).string_len(30).null())
                    .col(ColumnDef::new(PortalSessions::ClientId).big_integer().null())
                    .col(
                        ColumnDef::new(PortalSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PortalSessions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PortalSessions::Table, PortalSessions::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_portal_sessions_expires")
                    .table(PortalSessions::Table)
                    .col(PortalSessions::ExpiresAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PortalSessions::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum PortalSessions {
    Table,
    Id,
    #[iden = "portal_client_code"]
    PortalClientCode,
    #[iden = "portal_phone"]
    PortalPhone,
    #[iden = "client_id"]
    ClientId,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "expires_at"]
    ExpiresAt,
}
