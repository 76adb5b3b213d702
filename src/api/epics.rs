//! Epic endpoints.
//!
//! Epic responses embed their risks (and each risk its updates), matching
//! how the board views consume them in one request.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::risks::{risk_details_for_epic, RiskDetail};
use crate::api::{require_field, AppState};
use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::epic::{self, Epic, EpicPatch, EpicStatus, NewEpic};

/// Epic response shape: the epic row plus its risks.
#[derive(Debug, Serialize)]
pub struct EpicDetail {
    #[serde(flatten)]
    pub epic: Epic,
    pub risks: Vec<RiskDetail>,
}

#[derive(Debug, Deserialize)]
pub struct EpicListQuery {
    pub project_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DateChangeRequest {
    pub reason: String,
    #[serde(default)]
    pub proposed_date: Option<NaiveDate>,
}

/// Attach risks and their updates to an epic row.
pub(crate) async fn epic_detail(pool: &DbPool, epic: Epic) -> Result<EpicDetail, AppError> {
    let risks = risk_details_for_epic(pool, epic.id).await?;
    Ok(EpicDetail { epic, risks })
}

fn validate_status(status: &str) -> Result<(), AppError> {
    if EpicStatus::from_label(status).is_none() {
        return Err(AppError::invalid_input_field(
            format!("Unknown status '{}'", status),
            "status",
        ));
    }
    Ok(())
}

pub async fn list_epics(
    State(state): State<AppState>,
    Query(query): Query<EpicListQuery>,
) -> Result<Json<Vec<EpicDetail>>, AppError> {
    let epics = match query.project_id {
        Some(project_id) => epic::list_epics_for_project(&state.pool, project_id).await?,
        None => epic::list_epics(&state.pool).await?,
    };

    let mut details = Vec::with_capacity(epics.len());
    for e in epics {
        details.push(epic_detail(&state.pool, e).await?);
    }
    Ok(Json(details))
}

pub async fn create_epic(
    State(state): State<AppState>,
    Json(input): Json<NewEpic>,
) -> Result<Json<EpicDetail>, AppError> {
    require_field(&input.title, "title")?;
    if let Some(status) = &input.status {
        validate_status(status)?;
    }

    let created = epic::create_epic(&state.pool, &input).await?;
    Ok(Json(EpicDetail {
        epic: created,
        risks: Vec::new(),
    }))
}

pub async fn get_epic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EpicDetail>, AppError> {
    let found = epic::get_epic(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Epic"))?;
    Ok(Json(epic_detail(&state.pool, found).await?))
}

pub async fn update_epic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<EpicPatch>,
) -> Result<Json<EpicDetail>, AppError> {
    if let Some(title) = &patch.title {
        require_field(title, "title")?;
    }
    if let Some(status) = &patch.status {
        validate_status(status)?;
    }

    let updated = epic::update_epic(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Epic"))?;
    Ok(Json(epic_detail(&state.pool, updated).await?))
}

pub async fn delete_epic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if !epic::delete_epic(&state.pool, id).await? {
        return Err(AppError::not_found("Epic"));
    }
    Ok(Json(json!({ "message": "Epic deleted successfully" })))
}

pub async fn request_date_change(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<DateChangeRequest>,
) -> Result<Json<Value>, AppError> {
    require_field(&request.reason, "reason")?;

    let epic = epic::get_epic(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Epic"))?;

    state
        .notifier
        .send_date_change_request(&epic, &request.reason, request.proposed_date)
        .await?;

    Ok(Json(json!({
        "message": "Date change request sent successfully"
    })))
}
