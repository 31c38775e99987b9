//! Periodic task scheduler
//!
//! Runs background tasks at regular intervals.
//! Add new tasks by implementing the `PeriodicTask` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::time::interval;

use super::notification::NotificationDispatcher;
use super::portal::PortalSessionStore;
use super::sla::run_sla_sweep;
use crate::config::sla::SlaConfig;
use crate::state::AppState;

/// Trait for periodic background tasks
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name for logging
    fn name(&self) -> &'static str;

    /// How often to run (e.g., every 1 hour)
    fn interval(&self) -> Duration;

    /// Execute the task
    async fn run(&self) -> anyhow::Result<()>;
}

/// Tasks enabled for this configuration
pub fn tasks(state: &AppState) -> Vec<Box<dyn PeriodicTask>> {
    let mut tasks: Vec<Box<dyn PeriodicTask>> = vec![Box::new(PortalCleanupTask {
        sessions: state.sessions.clone(),
    })];

    if state.settings.sla.sweep_interval_secs > 0 {
        tasks.push(Box::new(SlaSweepTask {
            db: state.db.clone(),
            dispatcher: state.notifier.clone(),
            sla: state.settings.sla.clone(),
        }));
    }

    tasks
}

/// Start all periodic tasks
pub fn start_scheduler(state: &AppState) {
    for task in tasks(state) {
        tokio::spawn(async move {
            run_task(task).await;
        });
    }

    tracing::info!("Periodic task scheduler started");
}

/// Run a single task on its interval
async fn run_task(task: Box<dyn PeriodicTask>) {
    let mut ticker = interval(task.interval());

    // Skip the first immediate tick
    ticker.tick().await;

    loop {
        ticker.tick().await;

        tracing::debug!(task = task.name(), "Running periodic task");

        match task.run().await {
            Ok(()) => {
                tracing::debug!(task = task.name(), "Periodic task completed");
            }
            Err(e) => {
                tracing::error!(task = task.name(), error = %e, "Periodic task failed");
            }
        }
    }
}

// ============================================================================
// SLA Sweep Task
// ============================================================================

pub struct SlaSweepTask {
    db: sea_orm::DatabaseConnection,
    dispatcher: NotificationDispatcher,
    sla: SlaConfig,
}

#[async_trait]
impl PeriodicTask for SlaSweepTask {
    fn name(&self) -> &'static str {
        "sla_sweep"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.sla.sweep_interval_secs.max(1))
    }

    async fn run(&self) -> anyhow::Result<()> {
        run_sla_sweep(
            &self.db,
            &self.dispatcher,
            self.sla.days,
            self.sla.batch_limit,
            Utc::now(),
        )
        .await?;
        Ok(())
    }
}

// ============================================================================
// Portal Cleanup Task
// ============================================================================

/// Cleans up expired portal sessions and old passcodes
pub struct PortalCleanupTask {
    sessions: PortalSessionStore,
}

#[async_trait]
impl PeriodicTask for PortalCleanupTask {
    fn name(&self) -> &'static str {
        "portal_cleanup"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(60 * 60) // Every hour
    }

    async fn run(&self) -> anyhow::Result<()> {
        let (sessions, otps) = self.sessions.cleanup(Utc::now()).await?;

        if sessions > 0 || otps > 0 {
            tracing::info!(sessions, otps, "Cleaned up portal sessions and passcodes");
        }

        Ok(())
    }
}
