//! Migration: Create one_time_passwords table

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
                    .table(OneTimePasswords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OneTimePasswords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OneTimePasswords::ClientId).big_integer().not_null())
                    .col(ColumnDef::new(OneTimePasswords::Code).string_len(6).not_null())
                    .col(
                        ColumnDef::new(OneTimePasswords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OneTimePasswords::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OneTimePasswords::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(OneTimePasswords::RequestIp).string_len(45).null())
                    .col(ColumnDef::new(OneTimePasswords::UserAgent).string_len(300).null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(OneTimePasswords::Table, OneTimePasswords::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_otps_client_created")
                    .table(OneTimePasswords::Table)
                    .col(OneTimePasswords::ClientId)
                    .col(OneTimePasswords::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_otps_expires")
                    .table(OneTimePasswords::Table)
                    .col(OneTimePasswords::ExpiresAt)
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
                    .table(OneTimePasswords::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum OneTimePasswords {
    Table,
    Id,
    #[iden = "client_id"]
    ClientId,
    Code,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "expires_at"]
    ExpiresAt,
    #[iden = "used_at"]
    UsedAt,
    #[iden = "request_ip"]
    RequestIp,
    #[iden = "user_agent"]
    UserAgent,
}
