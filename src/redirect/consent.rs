//! Redirect consent carried by the override query parameter and the
//! persistent consent cookie.

use axum::http::{HeaderMap, HeaderValue, Uri};

use crate::request::{cookie_value, query_value};

/// Cookie recording that the visitor opted into the new site.
pub const CONSENT_COOKIE: &str = "pkggodev-redirect";

/// Query parameter that overrides the cookie for one request and updates it.
pub const OVERRIDE_PARAM: &str = "redirect";

const ON: &str = "on";
const OFF: &str = "off";

/// Tri-state redirect consent.
///
/// Precedence is override parameter, then cookie, then off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentState {
    On,
    Off,
    #[default]
    Unset,
}

impl ConsentState {
    /// Consent expressed by the `redirect` query parameter.
    pub fn from_override(uri: &Uri) -> Self {
        match query_value(uri, OVERRIDE_PARAM).as_deref() {
            Some(ON) => Self::On,
            Some(OFF) => Self::Off,
            _ => Self::Unset,
        }
    }

    /// Consent stored in the cookie. Only the "on" marker is meaningful;
    /// an off preference is stored as no cookie at all.
    pub fn from_cookie(headers: &HeaderMap) -> Self {
        match cookie_value(headers, CONSENT_COOKIE) {
            Some(ON) => Self::On,
            _ => Self::Unset,
        }
    }

    /// `self` if it is decided, otherwise `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        match self {
            Self::Unset => fallback,
            decided => decided,
        }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }

    /// Cookie change implied by an override parameter.
    pub fn cookie_update(self) -> Option<CookieUpdate> {
        match self {
            Self::On => Some(CookieUpdate::Set),
            Self::Off => Some(CookieUpdate::Clear),
            Self::Unset => None,
        }
    }
}

/// Instruction to write or delete the consent cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieUpdate {
    /// Store the "on" marker, path "/", session lifetime
    Set,
    /// Delete the cookie
    Clear,
}

impl CookieUpdate {
    /// `Set-Cookie` header value for this update.
    pub fn header_value(self) -> HeaderValue {
        match self {
            Self::Set => HeaderValue::from_static("pkggodev-redirect=on; Path=/"),
            Self::Clear => HeaderValue::from_static("pkggodev-redirect=; Path=/; Max-Age=0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_override_parsing() {
        let on: Uri = "/pkg?redirect=on".parse().unwrap();
        let off: Uri = "/pkg?redirect=off".parse().unwrap();
        let junk: Uri = "/pkg?redirect=maybe".parse().unwrap();
        let absent: Uri = "/pkg".parse().unwrap();

        assert_eq!(ConsentState::from_override(&on), ConsentState::On);
        assert_eq!(ConsentState::from_override(&off), ConsentState::Off);
        assert_eq!(ConsentState::from_override(&junk), ConsentState::Unset);
        assert_eq!(ConsentState::from_override(&absent), ConsentState::Unset);
    }

    #[test]
    fn test_cookie_only_honors_on_marker() {
        assert_eq!(
            ConsentState::from_cookie(&with_cookie("pkggodev-redirect=on")),
            ConsentState::On
        );
        assert_eq!(
            ConsentState::from_cookie(&with_cookie("pkggodev-redirect=off")),
            ConsentState::Unset
        );
        assert_eq!(
            ConsentState::from_cookie(&HeaderMap::new()),
            ConsentState::Unset
        );
    }

    #[test]
    fn test_precedence() {
        use ConsentState::*;

        assert!(On.or(Unset).is_on());
        assert!(!Off.or(On).is_on());
        assert!(On.or(Off).is_on());
        assert!(Unset.or(On).is_on());
        assert!(!Unset.or(Unset).is_on());
    }

    #[test]
    fn test_cookie_updates() {
        assert_eq!(ConsentState::On.cookie_update(), Some(CookieUpdate::Set));
        assert_eq!(ConsentState::Off.cookie_update(), Some(CookieUpdate::Clear));
        assert_eq!(ConsentState::Unset.cookie_update(), None);

        assert_eq!(
            CookieUpdate::Set.header_value(),
            "pkggodev-redirect=on; Path=/"
        );
        assert!(CookieUpdate::Clear
            .header_value()
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));
    }
}
