/// Platform-internal requests are never mirrored.
const RESERVED_PREFIX: &str = "/_ah/";

/// Asset extensions that are not documentation pages.
const SKIPPED_EXTENSIONS: [&str; 5] = [".css", ".html", ".js", ".txt", ".xml"];

/// Operational endpoints: bot check and manual refresh.
const SKIPPED_PATHS: [&str; 2] = ["/-/bot", "/-/refresh"];

/// Reports whether a request for `path` should be mirrored to the collector.
pub fn should_tee(path: &str) -> bool {
    if path.starts_with(RESERVED_PREFIX) {
        return false;
    }
    if extension(path).is_some_and(|ext| SKIPPED_EXTENSIONS.contains(&ext)) {
        return false;
    }
    !SKIPPED_PATHS.contains(&path)
}

/// Extension of the final path segment, including the dot.
fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment.rfind('.').map(|i| &segment[i..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("/static/app.js"), Some(".js"));
        assert_eq!(extension("/a.b/c"), None);
        assert_eq!(extension("/archive.tar.gz"), Some(".gz"));
        assert_eq!(extension("/pkg/"), None);
        assert_eq!(extension("/.hidden"), Some(".hidden"));
    }

    #[test]
    fn test_reserved_prefix() {
        assert!(!should_tee("/_ah/health"));
        assert!(!should_tee("/_ah/start"));
        assert!(should_tee("/_ah"));
    }

    #[test]
    fn test_asset_extensions() {
        for path in [
            "/static/app.js",
            "/static/site.css",
            "/robots.txt",
            "/sitemap.xml",
            "/-/about.html",
        ] {
            assert!(!should_tee(path), "{path}");
        }
    }

    #[test]
    fn test_operational_paths() {
        assert!(!should_tee("/-/bot"));
        assert!(!should_tee("/-/refresh"));
        assert!(should_tee("/-/refresh/extra"));
    }

    #[test]
    fn test_pages_are_teed() {
        for path in [
            "/",
            "/github.com/foo/bar",
            "/golang.org/x/net/html",
            "/gopkg.in/yaml.v2",
            "/-/go",
            "/static/app.json",
        ] {
            assert!(should_tee(path), "{path}");
        }
    }
}
