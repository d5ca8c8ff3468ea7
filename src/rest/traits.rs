//! rest::traits
//!
//! Rest trait definition for talking to the content store.
//!
//! # Design
//!
//! The `Rest` trait is async because every operation is network I/O.
//! Methods never panic; failures come back as `RestError` values that
//! name the URL involved, so callers can turn them into per-node events.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::core::types::PageUri;

/// Errors from REST operations.
///
/// Every variant carries the URL that failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RestError {
    /// The resource does not exist.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// The server rejected the credentials.
    #[error("authentication failed: {url}")]
    AuthFailed { url: String },

    /// The server returned an error status.
    #[error("API error: {status} - {url}: {message}")]
    ApiError {
        url: String,
        status: u16,
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {url}: {message}")]
    NetworkError { url: String, message: String },

    /// The response body could not be understood.
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl RestError {
    /// The URL the failed request was made against.
    pub fn url(&self) -> &str {
        match self {
            RestError::NotFound { url }
            | RestError::AuthFailed { url }
            | RestError::ApiError { url, .. }
            | RestError::NetworkError { url, .. }
            | RestError::InvalidResponse { url, .. } => url,
        }
    }

    /// Check if this is a missing-resource error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RestError::NotFound { .. })
    }
}

/// The content store's REST capabilities.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait Rest: Send + Sync {
    /// Get the implementation name (e.g., "http", "mock").
    fn name(&self) -> &'static str;

    /// Read a resource as JSON.
    ///
    /// `url` may point at the raw resource or its composed `.json` form.
    async fn get(&self, url: &str) -> Result<Value, RestError>;

    /// Write a resource.
    ///
    /// String payloads are sent as plain text, everything else as JSON.
    /// `key` is the write credential, when one is configured.
    async fn put(&self, url: &str, payload: &Value, key: Option<&str>) -> Result<(), RestError>;

    /// Resolve a public URL to the page it serves and the site prefix.
    async fn find_uri(&self, url: &str) -> Result<PageUri, RestError>;
}
