//! HTTP server lifecycle.
//!
//! Binds the listener, serves the API router (plus optional static
//! frontend files), and shuts down gracefully through a cancellation
//! token. The server runs on a spawned task; the returned handle reports
//! the bound address and stops the task on demand.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::api::{self, AppState};
use crate::error::AppError;

/// Handle to control the running HTTP server.
pub struct ServerHandle {
    cancel_token: CancellationToken,
    addr: std::net::SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the listener actually bound. With a port of 0 this is
    /// where the kernel put us.
    pub fn addr(&self) -> std::net::SocketAddr {
        self.addr
    }

    /// Stop the server gracefully and wait for the task to finish.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        let _ = self.task.await;
    }
}

/// Start the HTTP server.
///
/// With `static_dir` set, unmatched non-API paths serve files from that
/// directory and fall back to its `index.html` for client-side routes.
pub async fn start(
    addr: std::net::SocketAddr,
    state: AppState,
    static_dir: Option<PathBuf>,
) -> Result<ServerHandle, AppError> {
    let app = api::router(state);

    let app = match static_dir {
        Some(dist) => {
            // Read index.html once at startup for the SPA fallback.
            let index_html: Arc<str> = std::fs::read_to_string(dist.join("index.html"))
                .map_err(|e| AppError::internal(format!("Failed to read index.html: {}", e)))?
                .into();
            app.fallback(move |uri: Uri| {
                let html = index_html.clone();
                let dist = dist.clone();
                async move { spa_fallback(uri, &dist, &html).await }
            })
        }
        None => app,
    };

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;
    let bound = listener
        .local_addr()
        .map_err(|e| AppError::internal(format!("Failed to read bound address: {}", e)))?;

    tracing::info!(addr = %bound, "HTTP server starting");

    let cancel_token = CancellationToken::new();
    let cancel_clone = cancel_token.clone();

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        });

        if let Err(e) = server.await {
            tracing::error!(error = %e, "HTTP server error");
        }

        tracing::info!("HTTP server stopped");
    });

    Ok(ServerHandle {
        cancel_token,
        addr: bound,
        task,
    })
}

/// SPA-aware fallback handler.
///
/// API paths that didn't match a route get a plain 404 so the frontend
/// never parses HTML as JSON. Everything else tries the static directory
/// first, then serves `index.html` for client-side routes.
async fn spa_fallback(uri: Uri, dist: &FsPath, index_html: &str) -> Response {
    if uri.path().starts_with("/api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let req = Request::builder()
        .uri(uri.clone())
        .body(Body::empty())
        .unwrap();

    match ServeDir::new(dist).oneshot(req).await {
        Ok(res) if res.status() != StatusCode::NOT_FOUND => res.into_response(),
        // No matching static file, let the client router handle the path.
        _ => Html(index_html.to_owned()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::jira_client::JiraConnector;
    use crate::services::notifier::WebhookNotifier;
    use crate::services::sync_engine::SyncEngine;
    use tempfile::{tempdir, TempDir};

    async fn test_state() -> (AppState, TempDir) {
        let dir = tempdir().unwrap();
        let pool = db::initialize(&dir.path().join("test.db")).await.unwrap();
        let engine = Arc::new(SyncEngine::new(
            pool.clone(),
            Arc::new(JiraConnector::new(None)),
        ));
        let notifier = Arc::new(WebhookNotifier::new(None).unwrap());
        (
            AppState {
                pool,
                engine,
                notifier,
                tracker_configured: false,
            },
            dir,
        )
    }

    #[tokio::test]
    async fn test_serves_health_endpoint() {
        let (state, _dir) = test_state().await;
        let handle = start("127.0.0.1:0".parse().unwrap(), state, None)
            .await
            .unwrap();

        let body: serde_json::Value =
            reqwest::get(format!("http://{}/api/health", handle.addr()))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(body["status"], "ok");

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_static_dir_serves_spa_fallback() {
        let (state, _dir) = test_state().await;

        let dist = tempdir().unwrap();
        std::fs::write(dist.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::write(dist.path().join("app.js"), "console.log(1)").unwrap();

        let handle = start(
            "127.0.0.1:0".parse().unwrap(),
            state,
            Some(dist.path().to_path_buf()),
        )
        .await
        .unwrap();
        let base = format!("http://{}", handle.addr());

        // Real static file.
        let js = reqwest::get(format!("{}/app.js", base)).await.unwrap();
        assert_eq!(js.status().as_u16(), 200);
        assert_eq!(js.text().await.unwrap(), "console.log(1)");

        // Client-side route falls back to index.html.
        let page = reqwest::get(format!("{}/epics/42", base)).await.unwrap();
        assert_eq!(page.status().as_u16(), 200);
        assert_eq!(page.text().await.unwrap(), "<html>app</html>");

        // Unmatched API path stays a 404, never HTML.
        let missing = reqwest::get(format!("{}/api/nope", base)).await.unwrap();
        assert_eq!(missing.status().as_u16(), 404);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_missing_index_html_fails_startup() {
        let (state, _dir) = test_state().await;
        let empty = tempdir().unwrap();

        let result = start(
            "127.0.0.1:0".parse().unwrap(),
            state,
            Some(empty.path().to_path_buf()),
        )
        .await;
        assert!(result.is_err());
    }
}
