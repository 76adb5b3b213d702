//! HTTP API surface.
//!
//! Route handlers and the shared [`AppState`] they run against. Handlers
//! return `Result<_, AppError>`; the [`IntoResponse`] impl below maps
//! error flavors onto status codes and a `{"detail": ...}` body, so no
//! handler deals with status codes for failures itself.

pub mod epics;
pub mod export;
pub mod health;
pub mod projects;
pub mod risks;
pub mod sync;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::services::notifier::DateChangeNotifier;
use crate::services::sync_engine::SyncEngine;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub engine: Arc<SyncEngine>,
    pub notifier: Arc<dyn DateChangeNotifier>,
    /// Whether tracker credentials were present at startup.
    pub tracker_configured: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Connection { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Reject blank required string fields.
pub(crate) fn require_field(value: &str, field: &'static str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            format!("{} must not be empty", field),
            field,
        ));
    }
    Ok(())
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/api/projects/{id}", get(projects::get_project))
        .route("/api/epics", get(epics::list_epics).post(epics::create_epic))
        .route(
            "/api/epics/{id}",
            get(epics::get_epic)
                .put(epics::update_epic)
                .delete(epics::delete_epic),
        )
        .route(
            "/api/epics/{id}/risks",
            get(risks::list_risks_for_epic).post(risks::create_risk),
        )
        .route(
            "/api/epics/{id}/request-date-change",
            post(epics::request_date_change),
        )
        .route(
            "/api/risks/{id}",
            get(risks::get_risk)
                .put(risks::update_risk)
                .delete(risks::delete_risk),
        )
        .route(
            "/api/risks/{id}/updates",
            get(risks::list_risk_updates).post(risks::create_risk_update),
        )
        .route("/api/import/{key}", post(sync::import_project))
        .route("/api/export/epics.csv", get(export::export_epics))
        .route("/api/export/risks.csv", get(export::export_risks))
        .with_state(state)
}
