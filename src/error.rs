//! Application error types.
//!
//! The sync path distinguishes three failure categories (tracker
//! unreachable, remote project missing, issue query failed after a good
//! handshake) because the HTTP layer maps each to a different status
//! code. Everything else folds into the usual database/input/internal
//! buckets.

use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Could not establish or authenticate a tracker connection.
    ///
    /// Raised before any local mutation; surfaced as 503 on the manual
    /// import endpoint.
    #[error("Tracker connection error: {message}")]
    Connection { message: String },

    /// Requested resource not found (remote project key or local row).
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        key: Option<String>,
    },

    /// Remote issue query failed after a successful connection.
    #[error("Tracker fetch error: {message}")]
    Fetch { message: String },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database { message: String },

    /// Invalid input provided to a CRUD operation.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Outbound notification failed or is not configured.
    #[error("Notification error: {message}")]
    Notify { message: String },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a tracker connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            key: None,
        }
    }

    /// Create a not found error carrying the key that was looked up.
    pub fn not_found_with_key(resource: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            key: Some(key.into()),
        }
    }

    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error naming the offending field.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a notification error.
    pub fn notify(message: impl Into<String>) -> Self {
        Self::Notify {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error means the tracker could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Whether this error is a not-found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("row"),
            other => Self::database(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Transport failures after a good handshake count as fetch errors;
        // the connector maps its own handshake failures to Connection.
        if err.is_timeout() {
            Self::fetch("Request timed out")
        } else if err.is_connect() {
            Self::fetch("Connection dropped mid-request")
        } else {
            Self::fetch(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        Self::database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_impl() {
        let err = AppError::connection("credentials missing");
        assert_eq!(
            format!("{}", err),
            "Tracker connection error: credentials missing"
        );
    }

    #[test]
    fn test_not_found_with_key() {
        let err = AppError::not_found_with_key("tracker project", "ZZZ");
        assert!(err.is_not_found());
        match err {
            AppError::NotFound { resource, key } => {
                assert_eq!(resource, "tracker project");
                assert_eq!(key.as_deref(), Some("ZZZ"));
            }
            _ => panic!("expected NotFound"),
        }
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_category_predicates() {
        assert!(AppError::connection("x").is_connection());
        assert!(!AppError::fetch("x").is_connection());
        assert!(!AppError::fetch("x").is_not_found());
    }
}
