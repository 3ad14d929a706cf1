//! Webhook HTTP receiver.
//!
//! `GET /` is a health check. `POST /webhook` hands the raw body and the
//! `X-GitHub-Event` header to the [`WebhookSink`]. A delivery that fails to
//! classify is still acknowledged with 200, since it has been archived; only
//! an archive write failure yields 500.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::domain::models::WebhookConfig;
use crate::services::webhook_sink::WebhookSink;

const EVENT_HEADER: &str = "x-github-event";

/// Build the receiver's router around a shared sink.
pub fn router(sink: Arc<WebhookSink>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/webhook", post(receive_webhook))
        .with_state(sink)
        .layer(TraceLayer::new_for_http())
}

/// Webhook receiver bound to the configured address.
pub struct WebhookServer {
    config: WebhookConfig,
    sink: Arc<WebhookSink>,
}

impl WebhookServer {
    /// Server for `config`, archiving into `config.log_dir`.
    pub fn new(config: WebhookConfig) -> Self {
        let sink = Arc::new(WebhookSink::new(config.log_dir.clone()));
        Self { config, sink }
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            %addr,
            log_dir = %self.config.log_dir.display(),
            "webhook receiver listening"
        );

        axum::serve(listener, router(self.sink))
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "gitman-webhook"}))
}

async fn receive_webhook(
    State(sink): State<Arc<WebhookSink>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let event = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok());

    match sink.ingest(event, &body).await {
        Ok(ingested) => {
            let classified = ingested.outcome.as_ref().ok().map(|e| e.kind().as_str());
            (
                StatusCode::OK,
                Json(json!({
                    "status": "received",
                    "event": event.unwrap_or("unknown"),
                    "key": ingested.log_key,
                    "classified": classified,
                })),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to archive webhook");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "error": e.to_string()})),
            )
        }
    }
}
