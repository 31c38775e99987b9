//! "No recent client update" sweep

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::notification::{NotificationDispatcher, NotificationEvent};
use crate::error::Result;
use crate::models::case::{self, CaseStatus};
use crate::models::message_log::MessageStatus;
use crate::models::prelude::*;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlaReport {
    pub days: i64,
    /// Cases past the threshold, before the batch limit
    pub found: u64,
    pub notified: u64,
    pub sent: u64,
    pub failed: u64,
}

impl SlaReport {
    pub fn summary(&self) -> String {
        format!(
            "Found {} case(s) beyond SLA ({} days).",
            self.found, self.days
        )
    }
}

fn overdue_condition(cutoff: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(
            Condition::any()
                .add(case::Column::LastClientUpdateAt.is_null())
                .add(case::Column::LastClientUpdateAt.lt(cutoff)),
        )
        .add(case::Column::CurrentStatus.is_not_in(CaseStatus::TERMINAL))
}

/// Send `SLA_REASSURANCE` to open cases without a client update in `days`.
///
/// Individual failures only show up in the message logs; the sweep itself
/// always completes.
pub async fn run_sla_sweep(
    db: &DatabaseConnection,
    dispatcher: &NotificationDispatcher,
    days: i64,
    batch_limit: u64,
    now: DateTime<Utc>,
) -> Result<SlaReport> {
    let cutoff = now - Duration::days(days);

    let found = Case::find()
        .filter(overdue_condition(cutoff))
        .count(db)
        .await?;
    tracing::info!(found, days, "SLA sweep started");

    let overdue = Case::find()
        .filter(overdue_condition(cutoff))
        .order_by_asc(case::Column::Id)
        .limit(batch_limit)
        .find_also_related(Client)
        .all(db)
        .await?;

    let mut report = SlaReport {
        days,
        found,
        notified: 0,
        sent: 0,
        failed: 0,
    };

    for (case, client) in overdue {
        let Some(client) = client else { continue };
        report.notified += 1;
        match dispatcher
            .send_event(
                &case,
                &client,
                NotificationEvent::SlaReassurance,
                case.assigned_officer_id,
            )
            .await
        {
            Ok(log) if log.status == MessageStatus::Sent => report.sent += 1,
            Ok(_) => report.failed += 1,
            Err(e) => {
                report.failed += 1;
                tracing::error!(case_code = %case.case_code, error = %e, "SLA notification failed");
            }
        }
    }

    tracing::info!(
        found = report.found,
        notified = report.notified,
        sent = report.sent,
        failed = report.failed,
        "SLA check completed"
    );
    Ok(report)
}
