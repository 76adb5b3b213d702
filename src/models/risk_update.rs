//! Risk update model and queries.
//!
//! A risk update is a dated journal entry on a risk. Updates are append-only
//! and disappear with their risk.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::pool::DbPool;

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// A risk update row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiskUpdate {
    /// Local row ID.
    pub id: i64,

    /// Owning risk.
    pub risk_id: i64,

    /// The update text.
    pub update_text: String,

    /// Date the update was written.
    pub date_added: NaiveDate,

    /// Row creation timestamp (Unix).
    pub created_at: i64,
}

/// Input for appending an update to a risk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRiskUpdate {
    pub update_text: String,
    #[serde(default)]
    pub date_added: Option<NaiveDate>,
}

/// Insert a risk update and return the created row.
pub async fn create_risk_update(
    pool: &DbPool,
    risk_id: i64,
    input: &NewRiskUpdate,
) -> Result<RiskUpdate, sqlx::Error> {
    let date_added = input.date_added.unwrap_or_else(today);

    sqlx::query_as::<_, RiskUpdate>(
        r#"
        INSERT INTO risk_updates (risk_id, update_text, date_added)
        VALUES (?, ?, ?)
        RETURNING id, risk_id, update_text, date_added, created_at
        "#,
    )
    .bind(risk_id)
    .bind(&input.update_text)
    .bind(date_added)
    .fetch_one(pool)
    .await
}

/// List the updates on one risk, oldest first.
pub async fn list_updates_for_risk(
    pool: &DbPool,
    risk_id: i64,
) -> Result<Vec<RiskUpdate>, sqlx::Error> {
    sqlx::query_as::<_, RiskUpdate>(
        "SELECT id, risk_id, update_text, date_added, created_at
         FROM risk_updates WHERE risk_id = ? ORDER BY id",
    )
    .bind(risk_id)
    .fetch_all(pool)
    .await
}
