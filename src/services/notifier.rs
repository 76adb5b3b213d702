//! Date change request notifications.
//!
//! When a stakeholder asks to move an epic's target launch date, the
//! request goes out through a [`DateChangeNotifier`]. The shipped
//! implementation POSTs a JSON payload to a configured webhook; swapping
//! in a different channel only means implementing the trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::json;

use crate::error::AppError;
use crate::models::Epic;

/// Request timeout for webhook deliveries, in seconds.
const DELIVERY_TIMEOUT_SECS: u64 = 30;

/// Outbound channel for date change requests.
#[async_trait]
pub trait DateChangeNotifier: Send + Sync {
    /// Deliver a date change request for `epic`.
    async fn send_date_change_request(
        &self,
        epic: &Epic,
        reason: &str,
        proposed_date: Option<NaiveDate>,
    ) -> Result<(), AppError>;
}

/// Notifier that POSTs date change requests to a webhook URL.
///
/// Built without a URL it still constructs, and every delivery attempt
/// fails with a clear error until one is configured.
pub struct WebhookNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(webhook_url: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DELIVERY_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            webhook_url,
        })
    }
}

#[async_trait]
impl DateChangeNotifier for WebhookNotifier {
    async fn send_date_change_request(
        &self,
        epic: &Epic,
        reason: &str,
        proposed_date: Option<NaiveDate>,
    ) -> Result<(), AppError> {
        let url = self
            .webhook_url
            .as_deref()
            .ok_or_else(|| AppError::notify("No notification webhook is configured"))?;

        let payload = json!({
            "epic_id": epic.id,
            "epic_title": epic.title,
            "current_target_date": epic.target_launch_date,
            "proposed_date": proposed_date,
            "reason": reason,
        });

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::notify(format!("Failed to deliver notification: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::notify(format!(
                "Notification webhook returned status {}",
                response.status().as_u16()
            )));
        }

        tracing::info!(epic_id = epic.id, "Date change request delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::net::SocketAddr;
    use tokio::sync::mpsc;

    fn sample_epic() -> Epic {
        Epic {
            id: 7,
            project_id: None,
            title: "Checkout revamp".to_string(),
            description: None,
            target_launch_date: NaiveDate::from_ymd_opt(2026, 6, 1),
            actual_launch_date: None,
            status: "Planned".to_string(),
            external_key: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Minimal webhook endpoint capturing delivered payloads.
    async fn spawn_hook(status: StatusCode) -> (SocketAddr, mpsc::Receiver<serde_json::Value>) {
        let (tx, rx) = mpsc::channel::<serde_json::Value>(1);
        let app = Router::new().route(
            "/hook",
            post(move |Json(payload): Json<serde_json::Value>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(payload).await;
                    status
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, rx)
    }

    #[tokio::test]
    async fn test_delivery_posts_expected_payload() {
        let (addr, mut rx) = spawn_hook(StatusCode::OK).await;
        let notifier = WebhookNotifier::new(Some(format!("http://{}/hook", addr))).unwrap();

        notifier
            .send_date_change_request(
                &sample_epic(),
                "Vendor slipped two weeks",
                NaiveDate::from_ymd_opt(2026, 7, 1),
            )
            .await
            .unwrap();

        let payload = rx.recv().await.unwrap();
        assert_eq!(payload["epic_id"], 7);
        assert_eq!(payload["epic_title"], "Checkout revamp");
        assert_eq!(payload["current_target_date"], "2026-06-01");
        assert_eq!(payload["proposed_date"], "2026-07-01");
        assert_eq!(payload["reason"], "Vendor slipped two weeks");
    }

    #[tokio::test]
    async fn test_delivery_without_proposed_date_sends_null() {
        let (addr, mut rx) = spawn_hook(StatusCode::OK).await;
        let notifier = WebhookNotifier::new(Some(format!("http://{}/hook", addr))).unwrap();

        notifier
            .send_date_change_request(&sample_epic(), "Scope grew", None)
            .await
            .unwrap();

        let payload = rx.recv().await.unwrap();
        assert!(payload["proposed_date"].is_null());
    }

    #[tokio::test]
    async fn test_missing_webhook_url_is_a_notify_error() {
        let notifier = WebhookNotifier::new(None).unwrap();

        let err = notifier
            .send_date_change_request(&sample_epic(), "Scope grew", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Notify { .. }));
    }

    #[tokio::test]
    async fn test_error_status_is_a_notify_error() {
        let (addr, _rx) = spawn_hook(StatusCode::INTERNAL_SERVER_ERROR).await;
        let notifier = WebhookNotifier::new(Some(format!("http://{}/hook", addr))).unwrap();

        let err = notifier
            .send_date_change_request(&sample_epic(), "Scope grew", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Notify { .. }));
    }
}
