//! Mapping from legacy documentation URLs to their replacement-site
//! equivalents.
//!
//! The mapping is an ordered rule table evaluated first-match-wins. The last
//! rule matches every path, so every legacy URL has a destination.
//!
//! Rules see the percent-decoded path. A package path is escaped again when
//! the destination is built, so `/a%2Fb` and `/a/b` land on the same page.

use axum::http::Uri;
use std::collections::BTreeMap;
use std::fmt;

use crate::request::{decoded_path, has_query_key, query_value};

/// Host of the replacement documentation site.
pub const NEW_SITE_HOST: &str = "pkg.go.dev";

/// Query parameter attributing redirected traffic to the legacy site.
pub const ATTRIBUTION_PARAM: &str = "utm_source";
const ATTRIBUTION_VALUE: &str = "godoc";

const TAB_PARAM: &str = "tab";
const SEARCH_PARAM: &str = "q";

/// Rules in priority order.
const RULES: [PathRule; 6] = [
    PathRule::Vendored,
    PathRule::StandardLibrary,
    PathRule::About,
    PathRule::Home,
    PathRule::Subrepositories,
    PathRule::Package,
];

/// One entry of the legacy path table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRule {
    /// Any path inside a vendored dependency tree
    Vendored,
    /// `/-/go`, the standard library listing
    StandardLibrary,
    /// `/-/about`
    About,
    /// `/`, optionally carrying a search term
    Home,
    /// `/-/subrepo`, the sub-repository listing
    Subrepositories,
    /// Everything else is treated as a package page
    Package,
}

impl PathRule {
    /// The first rule that matches `path`.
    pub fn for_path(path: &str) -> Self {
        RULES
            .into_iter()
            .find(|rule| rule.matches(path))
            .unwrap_or(Self::Package)
    }

    fn matches(self, path: &str) -> bool {
        match self {
            Self::Vendored => path.contains("/vendor/") || path.ends_with("/vendor"),
            Self::StandardLibrary => path == "/-/go",
            Self::About => path == "/-/about",
            Self::Home => path == "/",
            Self::Subrepositories => path == "/-/subrepo",
            Self::Package => true,
        }
    }

    /// Rewrite `legacy` under this rule, adding any rule-specific query
    /// parameters to `query`. `path` is the decoded legacy path. Returns the
    /// new, escaped path.
    fn apply(
        self,
        legacy: &Uri,
        path: &str,
        query: &mut BTreeMap<&'static str, String>,
    ) -> String {
        match self {
            Self::Vendored => "/".to_string(),
            Self::StandardLibrary => {
                query.insert(TAB_PARAM, "packages".to_string());
                "/std".to_string()
            }
            Self::About => "/about".to_string(),
            Self::Home => match query_value(legacy, SEARCH_PARAM).filter(|q| !q.is_empty()) {
                Some(term) => {
                    query.insert(SEARCH_PARAM, term);
                    "/search".to_string()
                }
                None => "/".to_string(),
            },
            Self::Subrepositories => {
                query.insert(SEARCH_PARAM, "golang.org/x".to_string());
                "/search".to_string()
            }
            Self::Package => {
                let tab = if has_query_key(legacy, "imports") {
                    "imports"
                } else if has_query_key(legacy, "importers") {
                    "importedby"
                } else {
                    "doc"
                };
                query.insert(TAB_PARAM, tab.to_string());
                escape_path(path)
            }
        }
    }
}

/// Fully qualified URL on the replacement site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    path: String,
    query: BTreeMap<&'static str, String>,
}

impl Destination {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Query parameter names, sorted.
    pub fn query_keys(&self) -> impl Iterator<Item = &str> {
        self.query.keys().copied()
    }

    /// Form-urlencoded query with keys in sorted order.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "https://{}{}?{}",
            NEW_SITE_HOST,
            self.path,
            self.query_string()
        )
    }
}

/// Compute where a legacy URL lives on the replacement site.
pub fn compute_destination(legacy: &Uri) -> Destination {
    let mut query = BTreeMap::new();
    query.insert(ATTRIBUTION_PARAM, ATTRIBUTION_VALUE.to_string());

    let decoded = decoded_path(legacy);
    let path = PathRule::for_path(&decoded).apply(legacy, &decoded, &mut query);

    Destination { path, query }
}

/// Percent-encode a decoded path. Unreserved characters, `/` and the
/// sub-delimiters allowed in a path segment are kept as they are.
fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => escaped.push(char::from(byte)),
            b'-' | b'_' | b'.' | b'~' => escaped.push(char::from(byte)),
            b'$' | b'&' | b'+' | b',' | b'/' | b':' | b';' | b'=' | b'@' => {
                escaped.push(char::from(byte))
            }
            _ => escaped.push_str(&format!("%{byte:02X}")),
        }
    }
    escaped
}
