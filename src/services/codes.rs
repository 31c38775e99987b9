//! Sequential human-readable identifiers (`CL-0001`, `APP-0001`)
//!
//! Allocation goes through the `code_sequences` table: the counter row is
//! bumped with a single `UPDATE ... SET last_value = last_value + 1` inside
//! the transaction that inserts the new record. The bump is the first
//! statement, so concurrent allocators queue on the write lock instead of
//! failing a lock upgrade. The row is seeded from the highest stored code
//! only when the bump matched nothing. The unique index on the code column
//! is only a backstop.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set};

use crate::error::{AppError, Result};
use crate::models::prelude::*;

/// Which record family a code is allocated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Client,
    Case,
}

impl CodeKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            CodeKind::Client => "CL",
            CodeKind::Case => "APP",
        }
    }
}

/// Numeric suffix of a code; anything unparsable counts as 0
pub fn code_number(code: &str) -> u64 {
    code.split('-')
        .nth(1)
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(0)
}

pub fn format_code(prefix: &str, number: u64) -> String {
    format!("{}-{:04}", prefix, number)
}

/// Next code after `latest`, starting at `0001` when there is none
pub fn next_code(prefix: &str, latest: Option<&str>) -> String {
    match latest.filter(|l| !l.is_empty()) {
        None => format_code(prefix, 1),
        Some(latest) => format_code(prefix, code_number(latest) + 1),
    }
}

/// Allocate the next code for `kind`. Must be called on the transaction
/// that also inserts the record carrying the code.
pub async fn allocate_code<C: ConnectionTrait>(conn: &C, kind: CodeKind) -> Result<String> {
    let prefix = kind.prefix();

    // the UPDATE runs first so the transaction holds the write lock before any read
    if bump(conn, prefix).await? == 0 {
        let latest = latest_assigned(conn, kind).await?;
        let seed = latest.as_deref().map(code_number).unwrap_or(0);
        let row = code_sequence::ActiveModel {
            prefix: Set(prefix.to_string()),
            last_value: Set(seed as i64),
        };
        CodeSequence::insert(row)
            .on_conflict(
                OnConflict::column(code_sequence::Column::Prefix)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        tracing::debug!(prefix, seed, "Seeded code sequence");

        if bump(conn, prefix).await? == 0 {
            return Err(AppError::Internal(format!(
                "Code sequence {} missing",
                prefix
            )));
        }
    }

    let sequence = CodeSequence::find_by_id(prefix.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Code sequence {} missing", prefix)))?;

    Ok(format_code(prefix, sequence.last_value.max(0) as u64))
}

/// Increment the counter row, returning how many rows matched
async fn bump<C: ConnectionTrait>(conn: &C, prefix: &str) -> Result<u64> {
    let result = CodeSequence::update_many()
        .col_expr(
            code_sequence::Column::LastValue,
            Expr::col(code_sequence::Column::LastValue).add(1),
        )
        .filter(code_sequence::Column::Prefix.eq(prefix))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Highest code already stored for `kind`, compared as text
async fn latest_assigned<C: ConnectionTrait>(conn: &C, kind: CodeKind) -> Result<Option<String>> {
    let latest = match kind {
        CodeKind::Client => {
            Client::find()
                .select_only()
                .column_as(client::Column::ClientCode.max(), "latest")
                .into_tuple::<Option<String>>()
                .one(conn)
                .await?
        }
        CodeKind::Case => {
            Case::find()
                .select_only()
                .column_as(case::Column::CaseCode.max(), "latest")
                .into_tuple::<Option<String>>()
                .one(conn)
                .await?
        }
    };
    Ok(latest.flatten())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_code_starts_at_one() {
        assert_eq!(next_code("CL", None), "CL-0001");
        assert_eq!(next_code("APP", Some("")), "APP-0001");
    }

    #[test]
    fn test_next_code_increments_and_pads() {
        assert_eq!(next_code("APP", Some("APP-0007")), "APP-0008");
        assert_eq!(next_code("CL", Some("CL-0099")), "CL-0100");
        assert_eq!(next_code("CL", Some("CL-9999")), "CL-10000");
    }

    #[test]
    fn test_unparsable_suffix_counts_as_zero() {
        assert_eq!(next_code("APP", Some("APP-XYZ")), "APP-0001");
        assert_eq!(next_code("APP", Some("garbage")), "APP-0001");
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(CodeKind::Client.prefix(), "CL");
        assert_eq!(CodeKind::Case.prefix(), "APP");
    }
}
