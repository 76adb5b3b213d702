//! Health endpoint.
//!
//! Reports service version, whether tracker credentials are configured,
//! and row counts. The counts double as a database reachability probe:
//! if the pool is broken this handler returns 500 instead of "ok".

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::AppState;
use crate::error::AppError;

pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let project_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(&state.pool)
        .await?;

    let epic_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM epics")
        .fetch_one(&state.pool)
        .await?;

    let risk_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM risks")
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tracker_configured": state.tracker_configured,
        "projects": project_count,
        "epics": epic_count,
        "risks": risk_count,
    })))
}
