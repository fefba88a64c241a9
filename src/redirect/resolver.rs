use axum::http::{HeaderMap, Uri};

use super::consent::{ConsentState, CookieUpdate};
use super::destination::{compute_destination, Destination, ATTRIBUTION_PARAM};
use crate::request::{query_value, request_host};

/// Hosts beginning with this prefix serve API clients, which are never
/// redirected.
const API_HOST_PREFIX: &str = "api";

/// `utm_source` value the new site puts on links back to the legacy site.
const RETURN_MARKER: &str = "backtogodoc";

/// Outcome of redirect resolution for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Serve the legacy page
    Stay { cookie: Option<CookieUpdate> },
    /// Send the visitor to `destination`
    Redirect {
        destination: Destination,
        cookie: Option<CookieUpdate>,
    },
}

impl RedirectDecision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    pub fn destination(&self) -> Option<&Destination> {
        match self {
            Self::Redirect { destination, .. } => Some(destination),
            Self::Stay { .. } => None,
        }
    }

    pub fn cookie(&self) -> Option<CookieUpdate> {
        match self {
            Self::Stay { cookie } | Self::Redirect { cookie, .. } => *cookie,
        }
    }
}

/// Whether this visitor would be sent to the new site.
///
/// Pure: ignores the return marker and writes no cookie, so it also serves
/// to tag analytics events.
pub fn should_redirect(uri: &Uri, headers: &HeaderMap) -> bool {
    if is_api_request(uri, headers) {
        return false;
    }

    ConsentState::from_override(uri)
        .or(ConsentState::from_cookie(headers))
        .is_on()
}

/// Resolve the redirect decision, including the consent cookie change the
/// response has to carry.
pub fn resolve(uri: &Uri, headers: &HeaderMap) -> RedirectDecision {
    if is_returning_visitor(uri) {
        return RedirectDecision::Stay { cookie: None };
    }

    let cookie = ConsentState::from_override(uri).cookie_update();

    if !should_redirect(uri, headers) {
        return RedirectDecision::Stay { cookie };
    }

    RedirectDecision::Redirect {
        destination: compute_destination(uri),
        cookie,
    }
}

fn is_api_request(uri: &Uri, headers: &HeaderMap) -> bool {
    request_host(uri, headers).is_some_and(|host| host.starts_with(API_HOST_PREFIX))
}

/// Visitor explicitly navigated back from the new site.
fn is_returning_visitor(uri: &Uri) -> bool {
    query_value(uri, ATTRIBUTION_PARAM).as_deref() == Some(RETURN_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    fn headers(host: &'static str, cookie: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(host));
        if let Some(cookie) = cookie {
            headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        }
        headers
    }

    const COOKIE_ON: Option<&str> = Some("pkggodev-redirect=on");

    #[test]
    fn test_default_is_no_redirect() {
        assert!(!should_redirect(&uri("/github.com/foo/bar"), &headers("godoc.org", None)));
        assert!(!should_redirect(&uri("/github.com/foo/bar"), &HeaderMap::new()));
    }

    #[test]
    fn test_cookie_enables_redirect() {
        assert!(should_redirect(&uri("/github.com/foo/bar"), &headers("godoc.org", COOKIE_ON)));
        assert!(!should_redirect(
            &uri("/github.com/foo/bar"),
            &headers("godoc.org", Some("pkggodev-redirect=yes"))
        ));
    }

    #[test]
    fn test_query_param_overrides_cookie() {
        assert!(!should_redirect(&uri("/pkg?redirect=off"), &headers("godoc.org", COOKIE_ON)));
        assert!(should_redirect(&uri("/pkg?redirect=on"), &headers("godoc.org", None)));
        assert!(should_redirect(&uri("/pkg?redirect=bogus"), &headers("godoc.org", COOKIE_ON)));
    }

    #[test]
    fn test_api_host_never_redirects() {
        let api = headers("api.godoc.org", COOKIE_ON);
        assert!(!should_redirect(&uri("/pkg"), &api));
        assert!(!should_redirect(&uri("/pkg?redirect=on"), &api));
        assert!(!should_redirect(&uri("http://api.godoc.org/pkg?redirect=on"), &HeaderMap::new()));
        assert!(!resolve(&uri("/pkg?redirect=on"), &api).is_redirect());
    }

    #[test]
    fn test_resolve_sets_and_clears_cookie() {
        let on = resolve(&uri("/pkg?redirect=on"), &headers("godoc.org", None));
        assert!(on.is_redirect());
        assert_eq!(on.cookie(), Some(CookieUpdate::Set));
        assert_eq!(
            on.destination().map(ToString::to_string).as_deref(),
            Some("https://pkg.go.dev/pkg?tab=doc&utm_source=godoc")
        );

        let off = resolve(&uri("/pkg?redirect=off"), &headers("godoc.org", COOKIE_ON));
        assert!(!off.is_redirect());
        assert_eq!(off.cookie(), Some(CookieUpdate::Clear));
        assert_eq!(off.destination(), None);

        let plain = resolve(&uri("/pkg"), &headers("godoc.org", COOKIE_ON));
        assert!(plain.is_redirect());
        assert_eq!(plain.cookie(), None);
    }

    #[test]
    fn test_api_host_still_records_cookie_change() {
        let decision = resolve(&uri("/pkg?redirect=on"), &headers("api.godoc.org", None));
        assert_eq!(decision, RedirectDecision::Stay { cookie: Some(CookieUpdate::Set) });
    }

    #[test]
    fn test_returning_visitor_bypasses_redirect() {
        let returning = uri("/pkg?utm_source=backtogodoc");
        let with_cookie = headers("godoc.org", COOKIE_ON);

        assert_eq!(resolve(&returning, &with_cookie), RedirectDecision::Stay { cookie: None });
        assert_eq!(
            resolve(&uri("/pkg?utm_source=backtogodoc&redirect=off"), &with_cookie).cookie(),
            None
        );
        // The pure predicate still reports the visitor's preference.
        assert!(should_redirect(&returning, &with_cookie));
    }
}
