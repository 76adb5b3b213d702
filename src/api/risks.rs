//! Risk and risk update endpoints.
//!
//! Risks hang off an epic; updates hang off a risk. Creation routes check
//! the parent exists so a bad id reads as a 404 rather than a foreign key
//! failure.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::{require_field, AppState};
use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::epic;
use crate::models::risk::{self, NewRisk, Risk, RiskPatch};
use crate::models::risk_update::{self, NewRiskUpdate, RiskUpdate};

/// Risk response shape: the risk row plus its updates.
#[derive(Debug, Serialize)]
pub struct RiskDetail {
    #[serde(flatten)]
    pub risk: Risk,
    pub updates: Vec<RiskUpdate>,
}

/// Attach updates to a risk row.
async fn risk_detail(pool: &DbPool, risk: Risk) -> Result<RiskDetail, AppError> {
    let updates = risk_update::list_updates_for_risk(pool, risk.id).await?;
    Ok(RiskDetail { risk, updates })
}

/// All risks of an epic, each with its updates.
pub(crate) async fn risk_details_for_epic(
    pool: &DbPool,
    epic_id: i64,
) -> Result<Vec<RiskDetail>, AppError> {
    let risks = risk::list_risks_for_epic(pool, epic_id).await?;
    let mut details = Vec::with_capacity(risks.len());
    for r in risks {
        details.push(risk_detail(pool, r).await?);
    }
    Ok(details)
}

async fn require_epic(pool: &DbPool, epic_id: i64) -> Result<(), AppError> {
    epic::get_epic(pool, epic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Epic"))?;
    Ok(())
}

async fn require_risk(pool: &DbPool, risk_id: i64) -> Result<Risk, AppError> {
    risk::get_risk(pool, risk_id)
        .await?
        .ok_or_else(|| AppError::not_found("Risk"))
}

pub async fn list_risks_for_epic(
    State(state): State<AppState>,
    Path(epic_id): Path<i64>,
) -> Result<Json<Vec<RiskDetail>>, AppError> {
    require_epic(&state.pool, epic_id).await?;
    Ok(Json(risk_details_for_epic(&state.pool, epic_id).await?))
}

pub async fn create_risk(
    State(state): State<AppState>,
    Path(epic_id): Path<i64>,
    Json(input): Json<NewRisk>,
) -> Result<Json<RiskDetail>, AppError> {
    require_epic(&state.pool, epic_id).await?;
    require_field(&input.description, "description")?;

    let created = risk::create_risk(&state.pool, epic_id, &input).await?;
    Ok(Json(RiskDetail {
        risk: created,
        updates: Vec::new(),
    }))
}

pub async fn get_risk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RiskDetail>, AppError> {
    let found = require_risk(&state.pool, id).await?;
    Ok(Json(risk_detail(&state.pool, found).await?))
}

pub async fn update_risk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<RiskPatch>,
) -> Result<Json<RiskDetail>, AppError> {
    if let Some(description) = &patch.description {
        require_field(description, "description")?;
    }

    let updated = risk::update_risk(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Risk"))?;
    Ok(Json(risk_detail(&state.pool, updated).await?))
}

pub async fn delete_risk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if !risk::delete_risk(&state.pool, id).await? {
        return Err(AppError::not_found("Risk"));
    }
    Ok(Json(json!({ "message": "Risk deleted successfully" })))
}

pub async fn list_risk_updates(
    State(state): State<AppState>,
    Path(risk_id): Path<i64>,
) -> Result<Json<Vec<RiskUpdate>>, AppError> {
    require_risk(&state.pool, risk_id).await?;
    Ok(Json(
        risk_update::list_updates_for_risk(&state.pool, risk_id).await?,
    ))
}

pub async fn create_risk_update(
    State(state): State<AppState>,
    Path(risk_id): Path<i64>,
    Json(input): Json<NewRiskUpdate>,
) -> Result<Json<RiskUpdate>, AppError> {
    require_risk(&state.pool, risk_id).await?;
    require_field(&input.update_text, "update_text")?;

    let created = risk_update::create_risk_update(&state.pool, risk_id, &input).await?;
    Ok(Json(created))
}
