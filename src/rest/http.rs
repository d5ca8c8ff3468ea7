//! rest::http
//!
//! REST implementation backed by reqwest.
//!
//! # Design
//!
//! One shared `reqwest::Client` (and its connection pool) serves every
//! request. Status codes map onto [`RestError`] variants; the client does
//! not retry.
//!
//! # Authentication
//!
//! Writes send `Authorization: Token <key>` when a key is supplied. Reads
//! are anonymous.
//!
//! # Public URLs
//!
//! A public URL is served by the page stored under
//! `<prefix>/_uris/<base64(host + path)>`. Since a site may live under a
//! path, every candidate prefix is tried from the longest path down to the
//! bare host.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use super::traits::{Rest, RestError};
use crate::core::prefixes::{encode_public_uri, strip_scheme};
use crate::core::types::PageUri;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "clay-cli";

/// reqwest-backed implementation of [`Rest`].
#[derive(Debug, Clone, Default)]
pub struct HttpRest {
    /// HTTP client for making requests
    client: Client,
}

impl HttpRest {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Send a GET and return the successful response.
    async fn fetch(&self, url: &str) -> Result<Response, RestError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "application/json, text/plain")
            .send()
            .await
            .map_err(|e| RestError::NetworkError {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        check_status(url, response).await
    }

    /// Read a resource as plain text.
    async fn get_text(&self, url: &str) -> Result<String, RestError> {
        self.fetch(url)
            .await?
            .text()
            .await
            .map_err(|e| RestError::InvalidResponse {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

/// Map a non-success status to a `RestError`.
async fn check_status(url: &str, response: Response) -> Result<Response, RestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .ok()
        .filter(|body| !body.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
    let url = url.to_string();

    Err(match status {
        StatusCode::NOT_FOUND => RestError::NotFound { url },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RestError::AuthFailed { url },
        _ => RestError::ApiError {
            url,
            status: status.as_u16(),
            message,
        },
    })
}

/// Compute the `_uris` key and the candidate site prefixes for a public URL.
///
/// Ports are not part of stored URIs, so they are dropped from the key but
/// kept in the prefixes.
pub fn uri_lookup_candidates(url: &str) -> (String, Vec<String>) {
    let scheme = if url.starts_with("https://") {
        "https"
    } else {
        "http"
    };
    let without_scheme = strip_scheme(url);
    let (authority, path) = match without_scheme.split_once('/') {
        Some((authority, path)) => (authority, path.trim_end_matches('/')),
        None => (without_scheme, ""),
    };
    let host = authority.split(':').next().unwrap_or(authority);

    let key = encode_public_uri(&format!("{}/{}", host, path));

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    // The last segment names the page itself, never a site.
    let prefixes = (0..segments.len().max(1))
        .rev()
        .map(|n| {
            let mut prefix = format!("{}://{}", scheme, authority);
            for segment in &segments[..n] {
                prefix.push('/');
                prefix.push_str(segment);
            }
            prefix
        })
        .collect();

    (key, prefixes)
}

#[async_trait]
impl Rest for HttpRest {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, url: &str) -> Result<Value, RestError> {
        tracing::trace!(url, "GET");
        self.fetch(url)
            .await?
            .json()
            .await
            .map_err(|e| RestError::InvalidResponse {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn put(&self, url: &str, payload: &Value, key: Option<&str>) -> Result<(), RestError> {
        tracing::trace!(url, "PUT");
        let mut request = self.client.put(url).header(USER_AGENT, USER_AGENT_VALUE);
        if let Some(key) = key {
            request = request.header(AUTHORIZATION, format!("Token {}", key));
        }
        request = match payload {
            Value::String(text) => request
                .header(CONTENT_TYPE, "text/plain")
                .body(text.clone()),
            other => request.json(other),
        };

        let response = request.send().await.map_err(|e| RestError::NetworkError {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        check_status(url, response).await.map(|_| ())
    }

    async fn find_uri(&self, url: &str) -> Result<PageUri, RestError> {
        let (key, prefixes) = uri_lookup_candidates(url);

        for prefix in prefixes {
            let lookup = format!("{}/_uris/{}", prefix, key);
            match self.get_text(&lookup).await {
                Ok(body) => {
                    let uri = body.trim().trim_matches('"').to_string();
                    tracing::debug!(url, uri = %uri, prefix = %prefix, "resolved public url");
                    return Ok(PageUri { uri, prefix });
                }
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }

        Err(RestError::NotFound {
            url: url.to_string(),
        })
    }
}
