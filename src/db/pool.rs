//! SQLite connection pool.
//!
//! One pool serves both the API handlers and the background sync; WAL
//! journaling keeps reads flowing while a sweep is writing.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<Sqlite>;

/// Upper bound on pooled connections. SQLite serializes writers anyway,
/// so a small pool is enough for the API plus the sync engine.
const MAX_CONNECTIONS: u32 = 5;

/// How long a writer waits on a locked database before erroring.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Open (creating if missing) the database file and return a WAL-mode pool.
pub async fn create_pool(db_path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
        // Checkpoint every ~4MB of WAL so the sidecar file stays bounded
        .pragma("wal_autocheckpoint", "1000");

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await?;

    let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await?;
    debug_assert!(
        mode.0.eq_ignore_ascii_case("wal"),
        "WAL mode should be enabled, got: {}",
        mode.0
    );

    Ok(pool)
}
