//! Issue tracker abstraction.
//!
//! The sync engine talks to the tracker through these traits so the HTTP
//! client can be swapped out in tests. A [`TrackerConnector`] performs the
//! credential handshake and hands back a connected [`Tracker`]; every sync
//! call connects fresh, so credential problems surface at call time as
//! connection errors rather than poisoning a long-lived client.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppError;

/// Project metadata as the tracker reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteProject {
    /// Tracker project key (e.g. "ABC").
    pub key: String,

    /// Project display name.
    pub name: String,

    /// Project description, if the tracker has one.
    pub description: Option<String>,
}

/// An epic-type issue as the tracker reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEpic {
    /// Tracker issue key (e.g. "ABC-1").
    pub key: String,

    /// Issue summary line.
    pub summary: String,

    /// Issue description, if any.
    pub description: Option<String>,

    /// Due date, if set on the issue.
    pub due_date: Option<NaiveDate>,

    /// Raw workflow status name (e.g. "To Do", "Done").
    pub status_name: String,
}

/// Opens authenticated tracker sessions.
#[async_trait]
pub trait TrackerConnector: Send + Sync {
    /// Perform the credential handshake and return a connected tracker.
    ///
    /// Fails with [`AppError::Connection`] when credentials are missing or
    /// the tracker cannot be reached.
    async fn connect(&self) -> Result<Box<dyn Tracker>, AppError>;
}

/// Debug stand-in so tests can `unwrap_err` a `Result<Box<dyn Tracker>, _>`.
#[cfg(test)]
impl std::fmt::Debug for dyn Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Tracker")
    }
}

/// A connected tracker session.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Fetch project metadata by key.
    ///
    /// Fails with [`AppError::NotFound`] when the tracker has no such
    /// project.
    async fn get_project(&self, key: &str) -> Result<RemoteProject, AppError>;

    /// Fetch the epic-type issues of a project, newest first, capped at
    /// `max_results`.
    async fn search_epics(
        &self,
        project_key: &str,
        max_results: u32,
    ) -> Result<Vec<RemoteEpic>, AppError>;
}
