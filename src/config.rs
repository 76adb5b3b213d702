//! Runtime configuration from environment variables.
//!
//! Tracker credentials are deliberately optional at startup: an instance
//! without them still serves the CRUD API, and sync attempts fail with a
//! connection error at call time instead of preventing boot.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default SQLite database path, relative to the working directory.
const DEFAULT_DATABASE_PATH: &str = "risktrack.db";

/// Default interval between scheduled sync sweeps (one hour).
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3600;

/// Credentials and endpoint for the external issue tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Base URL of the tracker instance (e.g. `https://example.atlassian.net`).
    pub base_url: String,

    /// Account username (typically an email address).
    pub username: String,

    /// API token paired with the username for Basic auth.
    pub api_token: String,
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Tracker endpoint + credentials; `None` when any of the three
    /// variables is unset.
    pub tracker: Option<TrackerConfig>,

    /// Seconds between scheduled sync sweeps.
    pub sync_interval_secs: u64,

    /// Webhook URL for date-change request notifications.
    pub notify_webhook_url: Option<String>,

    /// Optional directory of static frontend files to serve.
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Recognized variables: `BIND_ADDR`, `DATABASE_PATH`,
    /// `TRACKER_BASE_URL`, `TRACKER_USERNAME`, `TRACKER_API_TOKEN`,
    /// `SYNC_INTERVAL_SECS`, `NOTIFY_WEBHOOK_URL`, `STATIC_DIR`.
    pub fn from_env() -> Result<Self, String> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid BIND_ADDR: {}", e))?;

        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATABASE_PATH));

        let tracker = match (
            non_empty(env::var("TRACKER_BASE_URL").ok()),
            non_empty(env::var("TRACKER_USERNAME").ok()),
            non_empty(env::var("TRACKER_API_TOKEN").ok()),
        ) {
            (Some(base_url), Some(username), Some(api_token)) => Some(TrackerConfig {
                base_url,
                username,
                api_token,
            }),
            _ => None,
        };

        let sync_interval_secs = match env::var("SYNC_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| format!("Invalid SYNC_INTERVAL_SECS: {:?}", raw))?,
            Err(_) => DEFAULT_SYNC_INTERVAL_SECS,
        };

        Ok(Self {
            bind_addr,
            database_path,
            tracker,
            sync_interval_secs,
            notify_webhook_url: non_empty(env::var("NOTIFY_WEBHOOK_URL").ok()),
            static_dir: non_empty(env::var("STATIC_DIR").ok()).map(PathBuf::from),
        })
    }
}

/// Treat unset and empty variables the same way.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_default_interval_is_one_hour() {
        assert_eq!(DEFAULT_SYNC_INTERVAL_SECS, 3600);
    }
}
