//! Project model and queries.
//!
//! A project groups epics. Projects imported from the issue tracker carry
//! the tracker's project key in `external_key`; locally created projects
//! leave it NULL.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::pool::DbPool;

/// A project row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Local row ID.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Free-form description.
    pub description: Option<String>,

    /// Issue tracker project key (e.g. "ABC"), unique when present.
    pub external_key: Option<String>,

    /// Row creation timestamp (Unix).
    pub created_at: i64,

    /// Row last update timestamp (Unix).
    pub updated_at: i64,
}

/// Input for creating a project.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_key: Option<String>,
}

/// Insert a project and return the created row.
pub async fn create_project(pool: &DbPool, input: &NewProject) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (name, description, external_key)
        VALUES (?, ?, ?)
        RETURNING id, name, description, external_key, created_at, updated_at
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.external_key)
    .fetch_one(pool)
    .await
}

/// Look up a project by local ID.
pub async fn get_project(pool: &DbPool, id: i64) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT id, name, description, external_key, created_at, updated_at
         FROM projects WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Look up a project by its issue tracker key.
pub async fn get_project_by_external_key(
    pool: &DbPool,
    external_key: &str,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT id, name, description, external_key, created_at, updated_at
         FROM projects WHERE external_key = ?",
    )
    .bind(external_key)
    .fetch_optional(pool)
    .await
}

/// List all projects, newest first.
pub async fn list_projects(pool: &DbPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT id, name, description, external_key, created_at, updated_at
         FROM projects ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await
}
