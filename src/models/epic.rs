//! Epic model and queries.
//!
//! Epics are the unit of delivery tracking. An epic imported from the issue
//! tracker carries the tracker's issue key in `external_key` and is kept in
//! step by the sync engine; `actual_launch_date` and the attached risks are
//! always local-only and never written by sync.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::pool::DbPool;

/// Delivery status of an epic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpicStatus {
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Launched,
    Blocked,
    Delayed,
    Cancelled,
}

impl EpicStatus {
    /// Parse an exact status label. Returns `None` for anything else.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Planned" => Some(Self::Planned),
            "In Progress" => Some(Self::InProgress),
            "Launched" => Some(Self::Launched),
            "Blocked" => Some(Self::Blocked),
            "Delayed" => Some(Self::Delayed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl From<&str> for EpicStatus {
    fn from(s: &str) -> Self {
        Self::from_label(s).unwrap_or(Self::Planned)
    }
}

impl std::fmt::Display for EpicStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "Planned"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Launched => write!(f, "Launched"),
            Self::Blocked => write!(f, "Blocked"),
            Self::Delayed => write!(f, "Delayed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// An epic row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Epic {
    /// Local row ID.
    pub id: i64,

    /// Owning project, if any.
    pub project_id: Option<i64>,

    /// Epic title (the tracker issue summary for imported epics).
    pub title: String,

    /// Free-form description.
    pub description: Option<String>,

    /// Planned launch date.
    pub target_launch_date: Option<NaiveDate>,

    /// Actual launch date, set manually once shipped.
    pub actual_launch_date: Option<NaiveDate>,

    /// Current status label: `Planned`, `In Progress`, `Launched`,
    /// `Blocked`, `Delayed`, `Cancelled`.
    pub status: String,

    /// Issue tracker epic key (e.g. "ABC-1"), unique when present.
    pub external_key: Option<String>,

    /// Row creation timestamp (Unix).
    pub created_at: i64,

    /// Row last update timestamp (Unix).
    pub updated_at: i64,
}

impl Epic {
    /// Parse the status label into an enum.
    pub fn status_enum(&self) -> EpicStatus {
        EpicStatus::from(self.status.as_str())
    }
}

/// Input for creating an epic.
///
/// `external_key` is never read from request bodies; the sync engine sets
/// it when importing from the tracker.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEpic {
    #[serde(default)]
    pub project_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_launch_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_launch_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(skip)]
    pub external_key: Option<String>,
}

/// Partial update for an epic. Absent fields leave the stored value
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpicPatch {
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_launch_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_launch_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
}

const EPIC_COLUMNS: &str = "id, project_id, title, description, target_launch_date, \
     actual_launch_date, status, external_key, created_at, updated_at";

/// Insert an epic and return the created row.
pub async fn create_epic(pool: &DbPool, input: &NewEpic) -> Result<Epic, sqlx::Error> {
    let status = input.status.as_deref().unwrap_or("Planned");

    sqlx::query_as::<_, Epic>(&format!(
        r#"
        INSERT INTO epics (project_id, title, description, target_launch_date,
                           actual_launch_date, status, external_key)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {EPIC_COLUMNS}
        "#,
    ))
    .bind(input.project_id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.target_launch_date)
    .bind(input.actual_launch_date)
    .bind(status)
    .bind(&input.external_key)
    .fetch_one(pool)
    .await
}

/// Look up an epic by local ID.
pub async fn get_epic(pool: &DbPool, id: i64) -> Result<Option<Epic>, sqlx::Error> {
    sqlx::query_as::<_, Epic>(&format!("SELECT {EPIC_COLUMNS} FROM epics WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Look up an epic by its issue tracker key.
pub async fn get_epic_by_external_key(
    pool: &DbPool,
    external_key: &str,
) -> Result<Option<Epic>, sqlx::Error> {
    sqlx::query_as::<_, Epic>(&format!(
        "SELECT {EPIC_COLUMNS} FROM epics WHERE external_key = ?"
    ))
    .bind(external_key)
    .fetch_optional(pool)
    .await
}

/// List all epics, newest first.
pub async fn list_epics(pool: &DbPool) -> Result<Vec<Epic>, sqlx::Error> {
    sqlx::query_as::<_, Epic>(&format!("SELECT {EPIC_COLUMNS} FROM epics ORDER BY id DESC"))
        .fetch_all(pool)
        .await
}

/// List the epics belonging to one project, newest first.
pub async fn list_epics_for_project(
    pool: &DbPool,
    project_id: i64,
) -> Result<Vec<Epic>, sqlx::Error> {
    sqlx::query_as::<_, Epic>(&format!(
        "SELECT {EPIC_COLUMNS} FROM epics WHERE project_id = ? ORDER BY id DESC"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Apply a partial update to an epic and return the fresh row.
///
/// Reads the current row, overlays the patch, and writes every mutable
/// column back. The write happens even for an empty patch, so `updated_at`
/// always moves. Returns `None` when the epic does not exist.
pub async fn update_epic(
    pool: &DbPool,
    id: i64,
    patch: &EpicPatch,
) -> Result<Option<Epic>, sqlx::Error> {
    let Some(current) = get_epic(pool, id).await? else {
        return Ok(None);
    };

    let project_id = patch.project_id.or(current.project_id);
    let title = patch.title.as_deref().unwrap_or(&current.title);
    let description = patch.description.as_ref().or(current.description.as_ref());
    let target_launch_date = patch.target_launch_date.or(current.target_launch_date);
    let actual_launch_date = patch.actual_launch_date.or(current.actual_launch_date);
    let status = patch.status.as_deref().unwrap_or(&current.status);

    sqlx::query(
        r#"
        UPDATE epics
        SET project_id = ?, title = ?, description = ?, target_launch_date = ?,
            actual_launch_date = ?, status = ?, updated_at = strftime('%s', 'now')
        WHERE id = ?
        "#,
    )
    .bind(project_id)
    .bind(title)
    .bind(description)
    .bind(target_launch_date)
    .bind(actual_launch_date)
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    get_epic(pool, id).await
}

/// Delete an epic (risks and their updates cascade).
///
/// Returns `true` when a row was removed.
pub async fn delete_epic(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM epics WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::{tempdir, TempDir};

    async fn setup_test_db() -> (DbPool, TempDir) {
        let dir = tempdir().unwrap();
        let pool = db::initialize(&dir.path().join("test.db")).await.unwrap();
        (pool, dir)
    }

    #[test]
    fn test_status_labels_round_trip() {
        for status in [
            EpicStatus::Planned,
            EpicStatus::InProgress,
            EpicStatus::Launched,
            EpicStatus::Blocked,
            EpicStatus::Delayed,
            EpicStatus::Cancelled,
        ] {
            assert_eq!(EpicStatus::from_label(&status.to_string()), Some(status));
        }
        assert_eq!(EpicStatus::from_label("On Fire"), None);
        assert_eq!(EpicStatus::from("On Fire"), EpicStatus::Planned);
    }

    #[test]
    fn test_status_serde_uses_labels() {
        let json = serde_json::to_string(&EpicStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[tokio::test]
    async fn test_create_defaults_to_planned() {
        let (pool, _dir) = setup_test_db().await;

        let epic = create_epic(
            &pool,
            &NewEpic {
                title: "Checkout rewrite".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(epic.status, "Planned");
        assert_eq!(epic.status_enum(), EpicStatus::Planned);
        assert!(epic.external_key.is_none());
    }

    #[tokio::test]
    async fn test_patch_leaves_absent_fields_untouched() {
        let (pool, _dir) = setup_test_db().await;

        let epic = create_epic(
            &pool,
            &NewEpic {
                title: "Original".to_string(),
                description: Some("Keep me".to_string()),
                target_launch_date: NaiveDate::from_ymd_opt(2026, 3, 1),
                status: Some("In Progress".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let patched = update_epic(
            &pool,
            epic.id,
            &EpicPatch {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(patched.title, "Renamed");
        assert_eq!(patched.description.as_deref(), Some("Keep me"));
        assert_eq!(patched.target_launch_date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(patched.status, "In Progress");
    }

    #[tokio::test]
    async fn test_empty_patch_still_writes() {
        let (pool, _dir) = setup_test_db().await;

        let epic = create_epic(
            &pool,
            &NewEpic {
                title: "Stable".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let after = update_epic(&pool, epic.id, &EpicPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.title, "Stable");
        assert!(after.updated_at >= epic.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_epic_returns_none() {
        let (pool, _dir) = setup_test_db().await;
        let result = update_epic(&pool, 999, &EpicPatch::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_by_external_key() {
        let (pool, _dir) = setup_test_db().await;

        create_epic(
            &pool,
            &NewEpic {
                title: "Imported".to_string(),
                external_key: Some("ABC-1".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let found = get_epic_by_external_key(&pool, "ABC-1").await.unwrap();
        assert!(found.is_some());
        assert!(get_epic_by_external_key(&pool, "ABC-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_epic() {
        let (pool, _dir) = setup_test_db().await;

        let epic = create_epic(
            &pool,
            &NewEpic {
                title: "Doomed".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(delete_epic(&pool, epic.id).await.unwrap());
        assert!(!delete_epic(&pool, epic.id).await.unwrap());
        assert!(get_epic(&pool, epic.id).await.unwrap().is_none());
    }
}
