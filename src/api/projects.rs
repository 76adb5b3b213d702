//! Project endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::epics::{epic_detail, EpicDetail};
use crate::api::{require_field, AppState};
use crate::error::AppError;
use crate::models::epic;
use crate::models::project::{self, NewProject, Project};

/// A project with its epics (and their risks) embedded.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub epics: Vec<EpicDetail>,
}

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = project::list_projects(&state.pool).await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<NewProject>,
) -> Result<Json<Project>, AppError> {
    require_field(&input.name, "name")?;

    let created = project::create_project(&state.pool, &input).await?;
    Ok(Json(created))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectDetail>, AppError> {
    let found = project::get_project(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project"))?;

    let mut epics = Vec::new();
    for e in epic::list_epics_for_project(&state.pool, found.id).await? {
        epics.push(epic_detail(&state.pool, e).await?);
    }

    Ok(Json(ProjectDetail {
        project: found,
        epics,
    }))
}
