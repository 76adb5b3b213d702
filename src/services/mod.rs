//! Business logic services.
//!
//! This module contains the core business logic for talking to the issue
//! tracker, synchronizing epics into local storage, scheduling background
//! sweeps, and producing exports and notifications.
//!
//! Services are designed to be testable independently of the HTTP layer;
//! the tracker side is reached only through the [`tracker`] traits.

pub mod export;
pub mod jira_client;
pub mod notifier;
pub mod scheduler;
pub mod status_map;
pub mod sync_engine;
pub mod tracker;

pub use jira_client::JiraConnector;
pub use notifier::{DateChangeNotifier, WebhookNotifier};
pub use scheduler::SchedulerHandle;
pub use sync_engine::{SyncEngine, SyncReport};
