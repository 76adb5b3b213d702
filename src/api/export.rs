//! CSV download endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::AppState;
use crate::error::AppError;
use crate::services::export;

fn csv_response(body: String, filename: &str) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    (headers, body).into_response()
}

pub async fn export_epics(State(state): State<AppState>) -> Result<Response, AppError> {
    let csv = export::epics_csv(&state.pool).await?;
    Ok(csv_response(csv, "epics.csv"))
}

pub async fn export_risks(State(state): State<AppState>) -> Result<Response, AppError> {
    let csv = export::risks_csv(&state.pool).await?;
    Ok(csv_response(csv, "risks.csv"))
}
