//! Tracker sync engine.
//!
//! Reconciles one tracker project's epics into local storage:
//! - Connects fresh for every sync, so credential problems fail fast
//! - Finds or creates the local project for the tracker key
//! - Fetches the project's epic issues (newest first, capped)
//! - Upserts each by external key, counting imports vs updates
//!
//! Upserts commit independently; an error on one issue aborts the rest of
//! that sync call but keeps what was already written. Concurrent syncs of
//! the same project key are serialized through a per-key lock so a manual
//! trigger cannot race the scheduled sweep on the same rows.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::epic::{self, EpicPatch, NewEpic};
use crate::models::project::{self, NewProject};
use crate::services::status_map::map_remote_status;
use crate::services::tracker::{RemoteEpic, TrackerConnector};

/// Cap on epics fetched per sync.
pub const MAX_SYNC_RESULTS: u32 = 100;

/// Cap on projects visited per sweep.
pub const MAX_SWEEP_PROJECTS: usize = 1000;

/// Per-key async locks serializing syncs of the same project.
#[derive(Clone, Default)]
struct KeyLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl KeyLocks {
    async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().await;
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}

/// Result of syncing one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    /// Local project name.
    pub project_name: String,

    /// Epics created this run.
    pub imported: i64,

    /// Epics updated this run.
    pub updated: i64,

    /// Epics the tracker returned.
    pub total_found: i64,
}

/// Result of one scheduled sweep over all linked projects.
#[derive(Debug, Default)]
pub struct SweepSummary {
    /// Projects synced without error.
    pub projects_synced: usize,

    /// Projects whose sync failed.
    pub projects_failed: usize,

    /// One message per failed project.
    pub errors: Vec<String>,
}

/// Sync engine.
///
/// Cheap to share behind an `Arc`; the HTTP import endpoint and the
/// scheduler both drive the same instance.
pub struct SyncEngine {
    pool: DbPool,
    connector: Arc<dyn TrackerConnector>,
    key_locks: KeyLocks,
}

impl SyncEngine {
    /// Create a new sync engine over the given store and tracker connector.
    pub fn new(pool: DbPool, connector: Arc<dyn TrackerConnector>) -> Self {
        Self {
            pool,
            connector,
            key_locks: KeyLocks::default(),
        }
    }

    /// Sync one tracker project into local storage.
    ///
    /// Connection and lookup failures surface before any local write. A
    /// failure while upserting an individual epic aborts the remaining
    /// epics of this call; earlier upserts stay committed.
    pub async fn sync_project(&self, project_key: &str) -> Result<SyncReport, AppError> {
        let _guard = self.key_locks.acquire(project_key).await;

        let tracker = self.connector.connect().await?;

        // Resolve the local project, creating it from tracker metadata on
        // first import.
        let local_project =
            match project::get_project_by_external_key(&self.pool, project_key).await? {
                Some(existing) => existing,
                None => {
                    let remote = tracker.get_project(project_key).await?;
                    let description = remote.description.clone().unwrap_or_else(|| {
                        format!("Imported from tracker project {}", remote.key)
                    });
                    let created = project::create_project(
                        &self.pool,
                        &NewProject {
                            name: remote.name.clone(),
                            description: Some(description),
                            external_key: Some(remote.key.clone()),
                        },
                    )
                    .await?;
                    tracing::info!(
                        project = %created.name,
                        key = %project_key,
                        "Created local project for tracker key"
                    );
                    created
                }
            };

        let epics = tracker.search_epics(project_key, MAX_SYNC_RESULTS).await?;
        let total_found = epics.len() as i64;
        tracing::debug!(key = %project_key, total_found, "Fetched epics from tracker");

        let mut imported = 0i64;
        let mut updated = 0i64;

        for remote in &epics {
            if self.upsert_epic(local_project.id, remote).await? {
                updated += 1;
            } else {
                imported += 1;
            }
        }

        tracing::info!(
            key = %project_key,
            imported,
            updated,
            total_found,
            "Sync complete"
        );

        Ok(SyncReport {
            project_name: local_project.name,
            imported,
            updated,
            total_found,
        })
    }

    /// Sync every project linked to the tracker, isolating failures.
    ///
    /// A failing project is logged and skipped, never aborting the rest
    /// of the sweep. Visits at most [`MAX_SWEEP_PROJECTS`] projects.
    pub async fn run_sweep(&self) -> Result<SweepSummary, AppError> {
        let projects = project::list_projects(&self.pool).await?;

        let mut summary = SweepSummary::default();

        for p in projects.into_iter().take(MAX_SWEEP_PROJECTS) {
            let Some(key) = p.external_key else {
                continue;
            };

            match self.sync_project(&key).await {
                Ok(report) => {
                    summary.projects_synced += 1;
                    tracing::info!(
                        key = %key,
                        imported = report.imported,
                        updated = report.updated,
                        "Scheduled sync finished"
                    );
                }
                Err(e) => {
                    summary.projects_failed += 1;
                    summary.errors.push(format!("{}: {}", key, e));
                    tracing::warn!(key = %key, error = %e, "Scheduled sync failed, continuing");
                }
            }
        }

        Ok(summary)
    }

    /// Upsert a single remote epic. Returns `true` when an existing epic
    /// was updated, `false` when a new one was created.
    ///
    /// The update path only overwrites fields the tracker actually sent;
    /// absent description and due date leave the local values alone, and
    /// `actual_launch_date`, `project_id`, and risks are never touched.
    async fn upsert_epic(&self, project_id: i64, remote: &RemoteEpic) -> Result<bool, AppError> {
        let status = map_remote_status(&remote.status_name).to_string();

        match epic::get_epic_by_external_key(&self.pool, &remote.key).await? {
            Some(existing) => {
                let patch = EpicPatch {
                    title: Some(remote.summary.clone()),
                    description: remote.description.clone(),
                    target_launch_date: remote.due_date,
                    status: Some(status),
                    ..Default::default()
                };
                epic::update_epic(&self.pool, existing.id, &patch).await?;
                Ok(true)
            }
            None => {
                let new_epic = NewEpic {
                    project_id: Some(project_id),
                    title: remote.summary.clone(),
                    description: remote.description.clone(),
                    target_launch_date: remote.due_date,
                    actual_launch_date: None,
                    status: Some(status),
                    external_key: Some(remote.key.clone()),
                };
                epic::create_epic(&self.pool, &new_epic).await?;
                Ok(false)
            }
        }
    }
}
