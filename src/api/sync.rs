//! Manual import endpoint.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::AppState;
use crate::error::AppError;
use crate::services::sync_engine::SyncReport;

/// Trigger a sync of one tracker project right now.
///
/// Shares the engine with the hourly scheduler, so a manual import of a
/// key the sweep is currently syncing waits its turn instead of racing.
pub async fn import_project(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SyncReport>, AppError> {
    let report = state.engine.sync_project(&key).await?;
    Ok(Json(report))
}
