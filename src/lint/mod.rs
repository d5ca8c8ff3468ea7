//! lint
//!
//! Validate content against a site.
//!
//! # Modules
//!
//! - [`graph`] - Recursive reference checks for components, pages, public URLs
//! - [`throttle`] - Fixed-window start limiter used by the graph walk
//! - [`schema`] - Structural checks for schema documents
//!
//! Like import, linting never fails as a whole: every problem is an error
//! event and the walk continues past it.

pub mod graph;
pub mod schema;
pub mod throttle;

use std::sync::Arc;

use tokio::sync::mpsc;

pub use graph::GraphValidator;
pub use schema::lint_schema;

use crate::core::types::ResultEvent;
use crate::rest::Rest;

/// Message reported when no URL could be resolved.
pub const NO_URL: &str = "URL is not defined! Please specify a url to lint";

/// Lint everything reachable from `url`, streaming result events.
///
/// Must be called from within a tokio runtime.
pub fn lint_url(
    rest: Arc<dyn Rest>,
    url: Option<&str>,
    concurrency: usize,
) -> mpsc::Receiver<ResultEvent> {
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        let (tx, rx) = mpsc::channel(1);
        if tx.try_send(ResultEvent::error(NO_URL)).is_err() {
            tracing::error!("failed to queue result event");
        }
        return rx;
    };

    GraphValidator::new(rest)
        .with_concurrency(concurrency)
        .lint(url)
}
