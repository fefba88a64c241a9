//! Analytics event mirrored to the collector

use axum::http::{header, HeaderMap, StatusCode, Uri};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::redirect::should_redirect;
use crate::request::{decoded_path, request_host};

/// One served request, as reported to the collector.
///
/// Field names on the wire follow the collector's existing schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsEvent {
    #[serde(rename = "Host")]
    pub host: String,

    #[serde(rename = "Path")]
    pub path: String,

    #[serde(rename = "Status")]
    pub status: u16,

    /// Absolute `https` URL of the request
    #[serde(rename = "URL")]
    pub url: String,

    /// Canonicalized header names to their values, in arrival order
    #[serde(rename = "Header")]
    pub headers: BTreeMap<String, Vec<String>>,

    /// Time spent serving the request, encoded as nanoseconds
    #[serde(rename = "Latency", serialize_with = "serialize_nanos")]
    pub latency: Duration,

    #[serde(rename = "IsRobot")]
    pub is_robot: bool,

    /// Whether the visitor would be sent to the new site
    #[serde(rename = "UsePkgGoDev")]
    pub redirected: bool,
}

impl AnalyticsEvent {
    pub fn from_request(
        uri: &Uri,
        headers: &HeaderMap,
        latency: Duration,
        is_robot: bool,
        status: StatusCode,
    ) -> Self {
        let host = request_host(uri, headers).unwrap_or_default().to_string();
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        Self {
            url: format!("https://{host}{path_and_query}"),
            host,
            path: decoded_path(uri).into_owned(),
            status: status.as_u16(),
            headers: collect_headers(headers),
            latency,
            is_robot,
            redirected: should_redirect(uri, headers),
        }
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    // The host is reported on its own.
    for (name, value) in headers.iter().filter(|(name, _)| **name != header::HOST) {
        collected
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}

/// `user-agent` -> `User-Agent`
fn canonical_header_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            canonical.push(c.to_ascii_uppercase());
        } else {
            canonical.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    canonical
}

fn serialize_nanos<S: Serializer>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX))
}
