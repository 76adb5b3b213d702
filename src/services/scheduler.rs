//! Hourly sync scheduler.
//!
//! Runs [`SyncEngine::run_sweep`] on a fixed interval in a background
//! task. The first sweep lands one full interval after startup, slow
//! sweeps never stack (missed ticks are skipped), and a failing sweep is
//! logged without stopping the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::services::sync_engine::SyncEngine;

/// Commands accepted by the scheduler task.
#[derive(Debug)]
enum SchedulerCommand {
    /// Run a sweep now, outside the timer.
    TriggerSweep,
    /// Stop the loop.
    Stop,
}

/// Handle to a running scheduler task.
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Request an immediate sweep without waiting for the next tick.
    pub async fn trigger_sweep(&self) {
        let _ = self.command_tx.send(SchedulerCommand::TriggerSweep).await;
    }

    /// Stop the scheduler and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.command_tx.send(SchedulerCommand::Stop).await;
        let _ = self.task.await;
    }
}

/// Start the background sync scheduler.
pub fn start(engine: Arc<SyncEngine>, interval_secs: u64) -> SchedulerHandle {
    let (command_tx, mut command_rx) = mpsc::channel::<SchedulerCommand>(16);

    let task = tokio::spawn(async move {
        tracing::info!(interval_secs, "Sync scheduler started");

        let mut ticker = time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; consume it so the first sweep
        // runs one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sweep(&engine).await;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::TriggerSweep) => sweep(&engine).await,
                        Some(SchedulerCommand::Stop) | None => break,
                    }
                }
            }
        }

        tracing::info!("Sync scheduler stopped");
    });

    SchedulerHandle { command_tx, task }
}

/// One sweep iteration. Errors are logged, never propagated; the loop
/// must survive any sweep outcome.
async fn sweep(engine: &SyncEngine) {
    match engine.run_sweep().await {
        Ok(summary) => {
            tracing::info!(
                synced = summary.projects_synced,
                failed = summary.projects_failed,
                "Sync sweep finished"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sync sweep failed");
        }
    }
}
