//! risktrack - Epic and risk tracking service with issue-tracker sync.
//!
//! Projects own epics, epics own risks, risks accumulate dated updates.
//! Projects linked to an external issue tracker get their epics pulled in
//! on a background schedule and reconciled by external key; the same import
//! can be triggered manually over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
