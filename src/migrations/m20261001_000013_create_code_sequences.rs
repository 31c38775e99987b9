//! Migration: Create code_sequences table
//!
//! One row per identifier prefix (`CL`, `APP`). Incrementing `last_value`
//! inside the inserting transaction serializes concurrent code allocation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CodeSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CodeSequences::Prefix)
                            .string_len(10)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CodeSequences::LastValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CodeSequences::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum CodeSequences {
    Table,
    Prefix,
    #[iden = "last_value"]
    LastValue,
}
