//! CSV export for epics and risks.
//!
//! Builds complete CSV documents in memory for the export endpoints.
//! Handles proper escaping of fields containing commas, quotes, or
//! newlines.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::{epic, risk};

/// Columns of the epic export, in order.
pub const EPIC_EXPORT_FIELDS: &[&str] = &[
    "id",
    "project_id",
    "title",
    "description",
    "target_launch_date",
    "actual_launch_date",
    "status",
    "external_key",
    "created_at",
    "updated_at",
];

/// Columns of the risk export, in order.
pub const RISK_EXPORT_FIELDS: &[&str] = &[
    "id",
    "epic_id",
    "epic_title",
    "description",
    "mitigation_plan",
    "date_added",
    "status",
    "created_at",
    "updated_at",
];

/// Escape a CSV field value.
///
/// Wraps in double quotes if the value contains commas, quotes, or
/// newlines. Doubles any existing quotes within the value.
fn escape_field(value: &str) -> String {
    let needs_quoting = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

fn date_field(date: Option<NaiveDate>) -> String {
    date.map_or_else(String::new, |d| d.to_string())
}

fn timestamp_field(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0).map_or_else(String::new, |dt| dt.to_rfc3339())
}

fn push_row(out: &mut String, fields: &[String]) {
    let row = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push('\n');
}

/// Export all epics as a CSV document.
pub async fn epics_csv(pool: &DbPool) -> Result<String, AppError> {
    let epics = epic::list_epics(pool).await?;

    let mut out = String::new();
    out.push_str(&EPIC_EXPORT_FIELDS.join(","));
    out.push('\n');

    for e in &epics {
        push_row(
            &mut out,
            &[
                e.id.to_string(),
                e.project_id.map_or_else(String::new, |id| id.to_string()),
                e.title.clone(),
                e.description.clone().unwrap_or_default(),
                date_field(e.target_launch_date),
                date_field(e.actual_launch_date),
                e.status.clone(),
                e.external_key.clone().unwrap_or_default(),
                timestamp_field(e.created_at),
                timestamp_field(e.updated_at),
            ],
        );
    }

    Ok(out)
}

/// Export all risks as a CSV document, with the owning epic's title
/// joined in for readability.
pub async fn risks_csv(pool: &DbPool) -> Result<String, AppError> {
    let risks = risk::list_risks(pool).await?;
    let epics = epic::list_epics(pool).await?;
    let titles: HashMap<i64, String> = epics.into_iter().map(|e| (e.id, e.title)).collect();

    let mut out = String::new();
    out.push_str(&RISK_EXPORT_FIELDS.join(","));
    out.push('\n');

    for r in &risks {
        push_row(
            &mut out,
            &[
                r.id.to_string(),
                r.epic_id.to_string(),
                titles.get(&r.epic_id).cloned().unwrap_or_default(),
                r.description.clone(),
                r.mitigation_plan.clone().unwrap_or_default(),
                r.date_added.to_string(),
                r.status.clone(),
                timestamp_field(r.created_at),
                timestamp_field(r.updated_at),
            ],
        );
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::epic::NewEpic;
    use crate::models::risk::NewRisk;
    use tempfile::{tempdir, TempDir};

    async fn setup_test_db() -> (DbPool, TempDir) {
        let dir = tempdir().unwrap();
        let pool = db::initialize(&dir.path().join("test.db")).await.unwrap();
        (pool, dir)
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("hello, world"), "\"hello, world\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[tokio::test]
    async fn test_empty_export_is_header_only() {
        let (pool, _dir) = setup_test_db().await;

        let csv = epics_csv(&pool).await.unwrap();
        assert_eq!(csv, format!("{}\n", EPIC_EXPORT_FIELDS.join(",")));
    }

    #[tokio::test]
    async fn test_epics_csv_escapes_and_formats() {
        let (pool, _dir) = setup_test_db().await;
        epic::create_epic(
            &pool,
            &NewEpic {
                title: "Launch, then iterate".to_string(),
                status: Some("Launched".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let csv = epics_csv(&pool).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], EPIC_EXPORT_FIELDS.join(","));
        assert!(lines[1].contains("\"Launch, then iterate\""));
        assert!(lines[1].contains("Launched"));
        // Timestamps render as RFC 3339.
        assert!(lines[1].contains('T'));
    }

    #[tokio::test]
    async fn test_risks_csv_joins_epic_title() {
        let (pool, _dir) = setup_test_db().await;
        let epic = epic::create_epic(
            &pool,
            &NewEpic {
                title: "Payments".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        risk::create_risk(
            &pool,
            epic.id,
            &NewRisk {
                description: "PCI audit may slip".to_string(),
                mitigation_plan: Some("Book auditor early".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let csv = risks_csv(&pool).await.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], RISK_EXPORT_FIELDS.join(","));
        assert!(lines[1].contains("Payments"));
        assert!(lines[1].contains("PCI audit may slip"));
        assert!(lines[1].contains("Book auditor early"));
    }
}
