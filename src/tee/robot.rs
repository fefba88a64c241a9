use axum::http::{header, HeaderMap};

/// Lowercase user-agent fragments identifying crawlers and scripted clients.
const ROBOT_MARKERS: [&str; 8] = [
    "bot",
    "crawler",
    "spider",
    "slurp",
    "curl",
    "wget",
    "python-requests",
    "go-http-client",
];

/// Heuristic robot check based on the `User-Agent` header.
pub fn is_robot(headers: &HeaderMap) -> bool {
    let Some(user_agent) = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
    else {
        return true;
    };

    let user_agent = user_agent.to_ascii_lowercase();
    ROBOT_MARKERS.iter().any(|marker| user_agent.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_agent(agent: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(agent));
        headers
    }

    #[test]
    fn test_browsers_are_not_robots() {
        assert!(!is_robot(&with_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
        )));
    }

    #[test]
    fn test_crawlers_are_robots() {
        assert!(is_robot(&with_agent(
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"
        )));
        assert!(is_robot(&with_agent("curl/8.5.0")));
        assert!(is_robot(&with_agent("Go-http-client/1.1")));
    }

    #[test]
    fn test_missing_agent_is_robot() {
        assert!(is_robot(&HeaderMap::new()));
        assert!(is_robot(&with_agent("   ")));
    }
}
