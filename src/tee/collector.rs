use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode, Uri};
use reqwest::{header::CONTENT_TYPE, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::event::AnalyticsEvent;
use super::filter::should_tee;
use crate::config::TeeConfig;
use crate::error::TeeError;
use crate::request::decoded_path;

const JSON_MIME_TYPE: &str = "application/json";

/// Destination for mirrored analytics events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver a single event. Called at most once per event.
    async fn deliver(&self, event: &AnalyticsEvent) -> Result<(), TeeError>;

    /// Where events go, for logging.
    fn target(&self) -> &str;
}

/// Posts JSON-encoded events to the collector endpoint.
pub struct HttpCollector {
    client: Client,
    endpoint: String,
}

impl HttpCollector {
    pub fn from_config(config: &TeeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("docshim-tee/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client for the analytics collector")?;

        Ok(Self {
            client,
            endpoint: config.collector_url.clone(),
        })
    }
}

#[async_trait]
impl EventSink for HttpCollector {
    async fn deliver(&self, event: &AnalyticsEvent) -> Result<(), TeeError> {
        let body = serde_json::to_vec(event)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, JSON_MIME_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TeeError::Status(status));
        }
        Ok(())
    }

    fn target(&self) -> &str {
        &self.endpoint
    }
}

/// Fire-and-forget mirroring of served requests.
#[derive(Clone)]
pub struct Tee {
    sink: Arc<dyn EventSink>,
}

impl Tee {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Build the event for a served request and hand it to the sink on a
    /// background task. Returns `None` when the path is not mirrored.
    ///
    /// Delivery failures are logged and dropped; nothing is retried.
    pub fn mirror(
        &self,
        uri: &Uri,
        headers: &HeaderMap,
        latency: Duration,
        is_robot: bool,
        status: StatusCode,
    ) -> Option<JoinHandle<()>> {
        let path = decoded_path(uri);
        if !should_tee(&path) {
            debug!(path = %path, "not teeing request");
            return None;
        }

        let event = AnalyticsEvent::from_request(uri, headers, latency, is_robot, status);
        let sink = Arc::clone(&self.sink);

        Some(tokio::spawn(async move {
            match sink.deliver(&event).await {
                Ok(()) => {
                    debug!(collector = %sink.target(), event = ?event, "request mirrored to collector");
                }
                Err(err) => {
                    warn!(
                        collector = %sink.target(),
                        event = ?event,
                        error = %err,
                        "failed to mirror request to collector"
                    );
                }
            }
        }))
    }
}
