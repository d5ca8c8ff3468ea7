//! core::prefixes
//!
//! Conversion between content URIs, site prefixes, and URLs.
//!
//! A site prefix is the scheme, host (and optional port and path) a site is
//! served from, e.g. `http://domain.com` or `http://localhost:3001/blog`.
//! URIs are the scheme-less identifiers stored in references, e.g.
//! `domain.com/_components/article/instances/foo`.
//!
//! # Example
//!
//! ```
//! use claywork::core::prefixes::{uri_to_url, url_to_prefix};
//!
//! let url = uri_to_url("http://domain.com", "domain.com/_components/a");
//! assert_eq!(url, "http://domain.com/_components/a");
//! assert_eq!(url_to_prefix(&url), "http://domain.com");
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use super::types::ResourceKind;

/// Path segments that start a content namespace.
const NAMESPACES: &[&str] = &["/_components", "/_pages", "/_uris", "/_lists", "/_users"];

const REF_PROP: &str = "_ref";

/// Strip `http://` or `https://` from a URL.
pub fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

/// Check if a string is an absolute http(s) URL.
pub fn has_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Convert a URL to a URI: no scheme, no port, no trailing slash.
///
/// `http://localhost:3001/blog/` becomes `localhost/blog`.
pub fn url_to_uri(url: &str) -> String {
    let without_scheme = strip_scheme(url).trim_end_matches('/');
    let (authority, path) = match without_scheme.split_once('/') {
        Some((authority, path)) => (authority, Some(path)),
        None => (without_scheme, None),
    };
    let host = authority.split(':').next().unwrap_or(authority);
    match path {
        Some(path) => format!("{}/{}", host, path),
        None => host.to_string(),
    }
}

/// Scheme of a URL, defaulting to `http`.
fn scheme(url: &str) -> &str {
    if url.starts_with("https://") {
        "https"
    } else {
        "http"
    }
}

/// Convert a URI to a URL under the given site prefix.
///
/// - Absolute URLs are returned unchanged.
/// - Site-relative URIs (`/_components/a`) are appended to the prefix.
/// - Host-qualified URIs get the prefix's scheme, and its port when the
///   host matches.
pub fn uri_to_url(prefix: &str, uri: &str) -> String {
    if has_scheme(uri) {
        return uri.to_string();
    }

    let prefix = prefix.trim_end_matches('/');
    if uri.starts_with('/') {
        return format!("{}{}", prefix, uri);
    }

    let authority = strip_scheme(prefix).split('/').next().unwrap_or_default();
    let uri = match authority.split_once(':') {
        Some((host, port)) if uri.starts_with(host) && !uri[host.len()..].starts_with(':') => {
            format!("{}:{}{}", host, port, &uri[host.len()..])
        }
        _ => uri.to_string(),
    };

    format!("{}://{}", scheme(prefix), uri)
}

/// Check if a URI resolves under the given site prefix.
///
/// Site-relative URIs always do. Host-qualified URIs and absolute URLs must
/// name the site's host (and path, if the prefix has one).
pub fn is_under_site(prefix: &str, uri: &str) -> bool {
    if uri.starts_with('/') {
        return true;
    }
    let site = strip_scheme(prefix).trim_end_matches('/');
    strip_scheme(&uri_to_url(prefix, uri))
        .strip_prefix(site)
        .map_or(false, |rest| rest.starts_with('/'))
}

/// Derive the site prefix from a URL.
///
/// Everything before the first content namespace; for URLs without one
/// (public URLs), the scheme and authority.
pub fn url_to_prefix(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if let Some(index) = NAMESPACES.iter().filter_map(|ns| url.find(ns)).min() {
        return url[..index].to_string();
    }

    let authority = strip_scheme(url).split('/').next().unwrap_or_default();
    format!("{}://{}", scheme(url), authority)
}

/// Classify a URL by the namespace it points into.
pub fn classify(url: &str) -> ResourceKind {
    if url.contains("/_components/") {
        ResourceKind::Component
    } else if url.contains("/_pages/") {
        ResourceKind::Page
    } else {
        ResourceKind::Other
    }
}

/// Encode a public URI (`host/path`, no scheme) into its `_uris` key.
///
/// Standard base64 over the raw bytes, padding included.
pub fn encode_public_uri(public_uri: &str) -> String {
    STANDARD.encode(public_uri.as_bytes())
}

/// Qualify a site-relative URI with a host (`/x` becomes `host/x`).
pub fn qualify(uri: &str, host: &str) -> String {
    if uri.starts_with('/') {
        format!("{}{}", host.trim_end_matches('/'), uri)
    } else {
        uri.to_string()
    }
}

/// Qualify every site-relative reference inside a payload.
///
/// `_ref` values are rewritten at any depth. Pages additionally carry their
/// `layout` and area lists as bare URI strings, which are rewritten too.
pub fn qualify_refs(uri: &str, payload: &mut Value, host: &str) {
    qualify_ref_props(payload, host);

    if classify(uri) != ResourceKind::Page {
        return;
    }
    if let Value::Object(map) = payload {
        for (key, value) in map.iter_mut() {
            match value {
                Value::String(s) if key == "layout" => *s = qualify(s, host),
                Value::Array(items) => {
                    for item in items.iter_mut() {
                        if let Value::String(s) = item {
                            *s = qualify(s, host);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn qualify_ref_props(value: &mut Value, host: &str) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                match child {
                    Value::String(s) if key == REF_PROP => *s = qualify(s, host),
                    _ => qualify_ref_props(child, host),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| qualify_ref_props(v, host)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod uri_to_url {
        use super::*;

        #[test]
        fn site_relative() {
            assert_eq!(
                uri_to_url("http://domain.com", "/_components/a"),
                "http://domain.com/_components/a"
            );
        }

        #[test]
        fn host_qualified() {
            assert_eq!(
                uri_to_url("https://domain.com", "domain.com/_pages/foo"),
                "https://domain.com/_pages/foo"
            );
        }

        #[test]
        fn keeps_port() {
            assert_eq!(
                uri_to_url("http://localhost:3001", "localhost/_components/a"),
                "http://localhost:3001/_components/a"
            );
        }

        #[test]
        fn absolute_url_unchanged() {
            assert_eq!(
                uri_to_url("http://domain.com", "http://other.com/_components/a"),
                "http://other.com/_components/a"
            );
        }
    }

    mod url_to_prefix {
        use super::*;

        #[test]
        fn component_url() {
            assert_eq!(
                url_to_prefix("http://domain.com/_components/a/instances/b"),
                "http://domain.com"
            );
        }

        #[test]
        fn site_with_path() {
            assert_eq!(
                url_to_prefix("http://domain.com/blog/_pages/index"),
                "http://domain.com/blog"
            );
        }

        #[test]
        fn public_url() {
            assert_eq!(
                url_to_prefix("https://domain.com/2020/some-article.html"),
                "https://domain.com"
            );
        }
    }

    #[test]
    fn url_to_uri_drops_scheme_and_port() {
        assert_eq!(url_to_uri("http://domain.com"), "domain.com");
        assert_eq!(url_to_uri("http://localhost:3001/blog/"), "localhost/blog");
    }

    #[test]
    fn classify_urls() {
        assert_eq!(
            classify("http://domain.com/_components/a"),
            ResourceKind::Component
        );
        assert_eq!(classify("http://domain.com/_pages/a"), ResourceKind::Page);
        assert_eq!(classify("http://domain.com/a.html"), ResourceKind::Other);
    }

    #[test]
    fn encodes_public_uri() {
        assert_eq!(encode_public_uri("domain.com/foo"), "ZG9tYWluLmNvbS9mb28=");
    }

    #[test]
    fn qualify_component_refs() {
        let mut payload = json!({
            "title": "/not/a/ref",
            "content": [{ "_ref": "/_components/paragraph/instances/bar" }],
            "image": { "_ref": "domain.com/_components/image/instances/x" }
        });
        qualify_refs("/_components/article/instances/foo", &mut payload, "domain.com");

        assert_eq!(payload["title"], "/not/a/ref");
        assert_eq!(
            payload["content"][0]["_ref"],
            "domain.com/_components/paragraph/instances/bar"
        );
        assert_eq!(
            payload["image"]["_ref"],
            "domain.com/_components/image/instances/x"
        );
    }

    #[test]
    fn keys_under_site() {
        assert!(is_under_site("http://domain.com", "/_components/a"));
        assert!(is_under_site("http://domain.com", "domain.com/_components/a"));
        assert!(is_under_site("http://localhost:3001", "localhost/_components/a"));
        assert!(is_under_site("http://domain.com", "https://domain.com/_pages/x"));
        assert!(is_under_site("http://domain.com/blog", "domain.com/blog/_pages/x"));
        assert!(!is_under_site("http://domain.com", "foo"));
        assert!(!is_under_site("http://domain.com", "other.com/_components/a"));
        assert!(!is_under_site("http://domain.com", "domain.com.evil/_components/a"));
        assert!(!is_under_site("http://domain.com/blog", "domain.com/_pages/x"));
    }

    #[test]
    fn qualify_page_layout_and_areas() {
        let mut payload = json!({
            "layout": "/_components/layout/instances/main",
            "main": ["/_components/article/instances/foo"]
        });
        qualify_refs("/_pages/index", &mut payload, "domain.com");

        assert_eq!(payload["layout"], "domain.com/_components/layout/instances/main");
        assert_eq!(payload["main"][0], "domain.com/_components/article/instances/foo");
    }
}
