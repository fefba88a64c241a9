use axum::http::StatusCode;
use thiserror::Error;

/// Failure to mirror an event to the collector. Never reaches the visitor.
#[derive(Debug, Error)]
pub enum TeeError {
    #[error("failed to encode analytics event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("collector request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector responded with {0}")]
    Status(StatusCode),
}

/// Failure to relay a request to the legacy site. Answered with 502.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}
