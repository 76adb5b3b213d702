//! Data models for the application.
//!
//! These models represent the core entities stored in the local SQLite database
//! and returned over the HTTP API.
//!
//! All models derive Serialize for API responses and FromRow for SQLx database
//! queries. Each module also carries the query helpers for its table.

pub mod epic;
pub mod project;
pub mod risk;
pub mod risk_update;

// Re-exports for convenient access
pub use epic::{Epic, EpicPatch, EpicStatus, NewEpic};
pub use project::{NewProject, Project};
pub use risk::{NewRisk, Risk, RiskPatch};
pub use risk_update::{NewRiskUpdate, RiskUpdate};
