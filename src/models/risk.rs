//! Risk model and queries.
//!
//! Risks always belong to an epic and are removed with it. They are purely
//! local: the sync engine never creates, updates, or deletes risks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::pool::DbPool;

/// Today's date, used when a risk is logged without an explicit date.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// A risk row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Risk {
    /// Local row ID.
    pub id: i64,

    /// Owning epic.
    pub epic_id: i64,

    /// What could go wrong.
    pub description: String,

    /// How the team plans to handle it.
    pub mitigation_plan: Option<String>,

    /// Status label, free-form. Defaults to `Open`.
    pub status: String,

    /// Date the risk was logged.
    pub date_added: NaiveDate,

    /// Row creation timestamp (Unix).
    pub created_at: i64,

    /// Row last update timestamp (Unix).
    pub updated_at: i64,
}

/// Input for logging a risk against an epic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRisk {
    pub description: String,
    #[serde(default)]
    pub mitigation_plan: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_added: Option<NaiveDate>,
}

/// Partial update for a risk. Absent fields leave the stored value
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskPatch {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mitigation_plan: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_added: Option<NaiveDate>,
}

const RISK_COLUMNS: &str =
    "id, epic_id, description, mitigation_plan, status, date_added, created_at, updated_at";

/// Insert a risk and return the created row.
pub async fn create_risk(
    pool: &DbPool,
    epic_id: i64,
    input: &NewRisk,
) -> Result<Risk, sqlx::Error> {
    let status = input.status.as_deref().unwrap_or("Open");
    let date_added = input.date_added.unwrap_or_else(today);

    sqlx::query_as::<_, Risk>(&format!(
        r#"
        INSERT INTO risks (epic_id, description, mitigation_plan, status, date_added)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {RISK_COLUMNS}
        "#,
    ))
    .bind(epic_id)
    .bind(&input.description)
    .bind(&input.mitigation_plan)
    .bind(status)
    .bind(date_added)
    .fetch_one(pool)
    .await
}

/// Look up a risk by local ID.
pub async fn get_risk(pool: &DbPool, id: i64) -> Result<Option<Risk>, sqlx::Error> {
    sqlx::query_as::<_, Risk>(&format!("SELECT {RISK_COLUMNS} FROM risks WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// List the risks logged against one epic, oldest first.
pub async fn list_risks_for_epic(pool: &DbPool, epic_id: i64) -> Result<Vec<Risk>, sqlx::Error> {
    sqlx::query_as::<_, Risk>(&format!(
        "SELECT {RISK_COLUMNS} FROM risks WHERE epic_id = ? ORDER BY id"
    ))
    .bind(epic_id)
    .fetch_all(pool)
    .await
}

/// List every risk, oldest first. Used by the CSV export.
pub async fn list_risks(pool: &DbPool) -> Result<Vec<Risk>, sqlx::Error> {
    sqlx::query_as::<_, Risk>(&format!("SELECT {RISK_COLUMNS} FROM risks ORDER BY id"))
        .fetch_all(pool)
        .await
}

/// Apply a partial update to a risk and return the fresh row.
///
/// Returns `None` when the risk does not exist.
pub async fn update_risk(
    pool: &DbPool,
    id: i64,
    patch: &RiskPatch,
) -> Result<Option<Risk>, sqlx::Error> {
    let Some(current) = get_risk(pool, id).await? else {
        return Ok(None);
    };

    let description = patch.description.as_deref().unwrap_or(&current.description);
    let mitigation_plan = patch
        .mitigation_plan
        .as_ref()
        .or(current.mitigation_plan.as_ref());
    let status = patch.status.as_deref().unwrap_or(&current.status);
    let date_added = patch.date_added.unwrap_or(current.date_added);

    sqlx::query(
        r#"
        UPDATE risks
        SET description = ?, mitigation_plan = ?, status = ?, date_added = ?,
            updated_at = strftime('%s', 'now')
        WHERE id = ?
        "#,
    )
    .bind(description)
    .bind(mitigation_plan)
    .bind(status)
    .bind(date_added)
    .bind(id)
    .execute(pool)
    .await?;

    get_risk(pool, id).await
}

/// Delete a risk (its updates cascade).
///
/// Returns `true` when a row was removed.
pub async fn delete_risk(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM risks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::epic::{create_epic, NewEpic};
    use tempfile::{tempdir, TempDir};

    async fn setup_epic() -> (DbPool, i64, TempDir) {
        let dir = tempdir().unwrap();
        let pool = db::initialize(&dir.path().join("test.db")).await.unwrap();
        let epic = create_epic(
            &pool,
            &NewEpic {
                title: "Host epic".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (pool, epic.id, dir)
    }

    #[tokio::test]
    async fn test_create_risk_defaults() {
        let (pool, epic_id, _dir) = setup_epic().await;

        let risk = create_risk(
            &pool,
            epic_id,
            &NewRisk {
                description: "Vendor API may be late".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(risk.status, "Open");
        assert_eq!(risk.date_added, today());
    }

    #[tokio::test]
    async fn test_update_risk_partial() {
        let (pool, epic_id, _dir) = setup_epic().await;

        let risk = create_risk(
            &pool,
            epic_id,
            &NewRisk {
                description: "Schema migration is tricky".to_string(),
                mitigation_plan: Some("Dry-run on a copy".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let patched = update_risk(
            &pool,
            risk.id,
            &RiskPatch {
                status: Some("Mitigated".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(patched.status, "Mitigated");
        assert_eq!(patched.mitigation_plan.as_deref(), Some("Dry-run on a copy"));
    }

    #[tokio::test]
    async fn test_risk_requires_existing_epic() {
        let (pool, _epic_id, _dir) = setup_epic().await;

        let result = create_risk(
            &pool,
            999,
            &NewRisk {
                description: "Orphan".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_risk() {
        let (pool, epic_id, _dir) = setup_epic().await;

        let risk = create_risk(
            &pool,
            epic_id,
            &NewRisk {
                description: "Short-lived".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(delete_risk(&pool, risk.id).await.unwrap());
        assert!(!delete_risk(&pool, risk.id).await.unwrap());
    }
}
