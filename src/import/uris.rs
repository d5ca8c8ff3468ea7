//! import::uris
//!
//! Rewrite entries into their on-the-wire form for one site.
//!
//! Public URL aliases (`/_uris/<alias>`) are stored under a key that is the
//! base64 of `<host>/<alias>`, where `<host>` is the site's base URL without
//! scheme or port. Their targets, and every site-relative reference inside
//! other payloads, are qualified with the host.
//!
//! # Example
//!
//! ```
//! use claywork::core::types::DispatchEntry;
//! use claywork::import::uris::UriResolver;
//! use serde_json::json;
//!
//! let resolver = UriResolver::for_prefix("http://domain.com");
//! let entry = resolver.resolve(DispatchEntry::new("/_uris/foo", json!("/_pages/foo")));
//!
//! assert_eq!(entry.uri, "/_uris/ZG9tYWluLmNvbS9mb28=");
//! assert_eq!(entry.payload, json!("domain.com/_pages/foo"));
//! ```

use serde_json::Value;

use crate::core::prefixes::{encode_public_uri, qualify, qualify_refs, url_to_uri};
use crate::core::types::DispatchEntry;

const URIS_SEGMENT: &str = "/_uris/";

/// Resolves aliases and references against a site's host.
#[derive(Debug, Clone)]
pub struct UriResolver {
    /// Base host without scheme, e.g. `domain.com`
    host: String,
}

impl UriResolver {
    /// Create a resolver for a base host (no scheme).
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a resolver for a site prefix such as `http://domain.com`.
    pub fn for_prefix(prefix: &str) -> Self {
        Self::new(url_to_uri(prefix))
    }

    /// The host aliases are encoded against.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Compute the stored key for a public URL alias.
    pub fn alias_key(&self, alias: &str) -> String {
        encode_public_uri(&format!("{}/{}", self.host, alias))
    }

    /// Rewrite one entry.
    pub fn resolve(&self, entry: DispatchEntry) -> DispatchEntry {
        let DispatchEntry { uri, mut payload } = entry;

        if let Some(index) = uri.find(URIS_SEGMENT) {
            let alias = &uri[index + URIS_SEGMENT.len()..];
            let key = self.alias_key(alias);
            let resolved = format!("{}{}{}", &uri[..index], URIS_SEGMENT, key);
            if let Value::String(target) = &payload {
                payload = Value::String(qualify(target, &self.host));
            }
            tracing::trace!(alias, key = %key, "encoded uri alias");
            return DispatchEntry::new(resolved, payload);
        }

        qualify_refs(&uri, &mut payload, &self.host);
        DispatchEntry::new(uri, payload)
    }
}
