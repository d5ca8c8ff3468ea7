//! rest::mock
//!
//! Mock REST implementation for deterministic testing.
//!
//! # Design
//!
//! The mock stores resources in memory, keyed by full URL. Writes store
//! the payload so later reads see it. Individual URLs can be configured to
//! fail, and an artificial latency makes concurrency observable: the mock
//! records the highest number of requests it ever had in flight.
//!
//! # Example
//!
//! ```
//! use claywork::rest::mock::MockRest;
//! use claywork::rest::Rest;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let rest = MockRest::new()
//!     .with_resource("http://domain.com/_components/a", json!({ "b": "c" }));
//!
//! let data = rest.get("http://domain.com/_components/a").await.unwrap();
//! assert_eq!(data, json!({ "b": "c" }));
//! assert!(rest.get("http://domain.com/_components/z").await.is_err());
//! # });
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::traits::{Rest, RestError};
use crate::core::types::PageUri;

/// Mock REST store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockRest {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockRestInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockRestInner {
    /// Stored resources by URL.
    resources: HashMap<String, Value>,
    /// Public URL resolutions.
    public_urls: HashMap<String, PageUri>,
    /// URLs whose writes fail.
    failing_writes: HashSet<String>,
    /// Delay applied to every request.
    latency: Option<Duration>,
    /// Requests currently in flight.
    in_flight: usize,
    /// High-water mark of `in_flight`.
    max_in_flight: usize,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOperation {
    Get {
        url: String,
    },
    Put {
        url: String,
        payload: Value,
        key: Option<String>,
    },
    FindUri {
        url: String,
    },
}

impl MockRest {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockRestInner::default())),
        }
    }

    /// Add a readable resource.
    pub fn with_resource(self, url: impl Into<String>, data: Value) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.resources.insert(url.into(), data);
        }
        self
    }

    /// Add a public URL resolution.
    pub fn with_public_url(
        self,
        url: impl Into<String>,
        uri: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.public_urls.insert(
                url.into(),
                PageUri {
                    uri: uri.into(),
                    prefix: prefix.into(),
                },
            );
        }
        self
    }

    /// Make writes to a URL fail with a server error.
    pub fn fail_write(self, url: impl Into<String>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.failing_writes.insert(url.into());
        }
        self
    }

    /// Delay every request by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.latency = Some(latency);
        }
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Get the URLs written to, in order.
    pub fn written_urls(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::Put { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    /// Count reads of a URL.
    pub fn get_count(&self, url: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::Get { url: u } if u == url))
            .count()
    }

    /// Get a stored resource (for test verification).
    pub fn resource(&self, url: &str) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        inner.resources.get(url).cloned()
    }

    /// Highest number of requests that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.max_in_flight
    }

    /// Record an operation and mark a request as started.
    fn begin(&self, op: MockOperation) -> Option<Duration> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
        inner.in_flight += 1;
        inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
        inner.latency
    }

    /// Mark a request as finished.
    fn end(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;
    }

    async fn simulate(&self, op: MockOperation) {
        if let Some(latency) = self.begin(op) {
            tokio::time::sleep(latency).await;
        }
        self.end();
    }
}

impl Default for MockRest {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rest for MockRest {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get(&self, url: &str) -> Result<Value, RestError> {
        self.simulate(MockOperation::Get {
            url: url.to_string(),
        })
        .await;

        let inner = self.inner.lock().unwrap();
        inner
            .resources
            .get(url)
            .cloned()
            .ok_or_else(|| RestError::NotFound {
                url: url.to_string(),
            })
    }

    async fn put(&self, url: &str, payload: &Value, key: Option<&str>) -> Result<(), RestError> {
        self.simulate(MockOperation::Put {
            url: url.to_string(),
            payload: payload.clone(),
            key: key.map(str::to_string),
        })
        .await;

        let mut inner = self.inner.lock().unwrap();
        if inner.failing_writes.contains(url) {
            return Err(RestError::ApiError {
                url: url.to_string(),
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        inner.resources.insert(url.to_string(), payload.clone());
        Ok(())
    }

    async fn find_uri(&self, url: &str) -> Result<PageUri, RestError> {
        self.simulate(MockOperation::FindUri {
            url: url.to_string(),
        })
        .await;

        let inner = self.inner.lock().unwrap();
        inner
            .public_urls
            .get(url)
            .cloned()
            .ok_or_else(|| RestError::NotFound {
                url: url.to_string(),
            })
    }
}
