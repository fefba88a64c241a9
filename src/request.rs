//! Read-only accessors over inbound request data
//!
//! Every lookup here is total: missing or malformed input yields `None`
//! rather than an error, so callers fall through to their default branch.

use axum::http::{header, HeaderMap, Uri};
use std::borrow::Cow;

/// Best-available host for a request: the URI authority when the request
/// carried an absolute URI, otherwise the `Host` header.
pub fn request_host<'a>(uri: &'a Uri, headers: &'a HeaderMap) -> Option<&'a str> {
    if let Some(authority) = uri.authority() {
        return Some(authority.as_str());
    }

    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
}

/// Percent-decoded request path. The raw path is returned when the decoded
/// bytes are not valid UTF-8.
pub fn decoded_path(uri: &Uri) -> Cow<'_, str> {
    urlencoding::decode(uri.path()).unwrap_or(Cow::Borrowed(uri.path()))
}

/// First decoded value of a query parameter.
pub fn query_value(uri: &Uri, name: &str) -> Option<String> {
    query_pairs(uri)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Whether a query parameter is present at all, with or without a value.
pub fn has_query_key(uri: &Uri, name: &str) -> bool {
    query_pairs(uri).any(|(key, _)| key == name)
}

fn query_pairs(uri: &Uri) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
    url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
}

/// Value of the first cookie named `name` across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}
