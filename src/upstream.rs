//! Forwarding of non-redirected requests to the legacy site

use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;

/// Largest request body forwarded to the legacy site. Larger bodies are
/// answered with 413 before the upstream is contacted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Reverse proxy for the legacy documentation site.
pub struct LegacyUpstream {
    client: Client,
    base_url: String,
}

impl LegacyUpstream {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed to build HTTP client for the legacy upstream")?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replay a buffered request against the legacy site and relay its
    /// response.
    pub async fn forward(
        &self,
        method: Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response, ProxyError> {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let target = format!("{}{}", self.base_url, path_and_query);

        let mut forwarded = end_to_end_headers(headers);
        forwarded.remove(header::HOST);
        if let Some(host) = headers.get(header::HOST) {
            forwarded.insert(HeaderName::from_static("x-forwarded-host"), host.clone());
        }

        let upstream = self
            .client
            .request(method, target)
            .headers(forwarded)
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let mut response_headers = end_to_end_headers(upstream.headers());
        response_headers.remove(header::CONTENT_LENGTH);
        let bytes = upstream.bytes().await?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

/// Copy of `headers` without hop-by-hop headers, including any the sender
/// named in `Connection`.
fn end_to_end_headers(headers: &HeaderMap<HeaderValue>) -> HeaderMap {
    let mut filtered = headers.clone();

    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in &listed {
        filtered.remove(name);
    }

    for name in &HOP_BY_HOP {
        filtered.remove(name);
    }
    filtered
}

/// Fallback handler serving every path from the legacy upstream.
///
/// The body is buffered by the `Bytes` extractor, which rejects bodies over
/// the router's `DefaultBodyLimit` with 413.
pub async fn proxy_handler(
    State(upstream): State<Arc<LegacyUpstream>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();

    match upstream.forward(method, &uri, &headers, body).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(
                upstream = %upstream.base_url(),
                path = %path,
                error = %err,
                "legacy upstream request failed"
            );
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
