//! import
//!
//! Import bootstrap or dispatch data into a site.
//!
//! # Pipeline
//!
//! ```text
//! text ──split──▶ documents ──parse/merge/flatten──▶ entries
//!      ──UriResolver──▶ wire entries ──PublishExpander──▶ plans
//!      ──DispatchPipeline──▶ ResultEvents
//! ```
//!
//! Parse failures short-circuit: the run produces exactly one error event
//! and nothing is written. Write failures are reported per entry.
//!
//! # Modules
//!
//! - [`split`] - Marker and repeated-root document splitting
//! - [`bootstrap`] - Format detection, parsing, merging, flattening
//! - [`uris`] - Alias encoding and reference qualification
//! - [`publish`] - Published-copy expansion
//! - [`dispatch`] - Bounded-concurrency writes

pub mod bootstrap;
pub mod dispatch;
pub mod publish;
pub mod split;
pub mod uris;

use std::sync::Arc;

use tokio::sync::mpsc;

pub use bootstrap::{InputFormat, ParseError};

use crate::core::config::{sanitize_url, DEFAULT_CONCURRENCY};
use crate::core::types::ResultEvent;
use crate::rest::Rest;
use dispatch::DispatchPipeline;
use publish::PublishExpander;
use uris::UriResolver;

/// Message reported when no site could be resolved.
pub const NO_URL: &str = "URL is not defined! Please specify a site prefix to import to";

/// Options for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// How to interpret the input
    pub format: InputFormat,
    /// Also write `@published` copies
    pub publish: bool,
    /// Write credential
    pub key: Option<String>,
    /// Maximum writes in flight
    pub concurrency: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            format: InputFormat::default(),
            publish: false,
            key: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Import `text` into the site at `prefix`, streaming result events.
///
/// Must be called from within a tokio runtime.
pub fn import(
    rest: Arc<dyn Rest>,
    text: &str,
    prefix: Option<&str>,
    options: ImportOptions,
) -> mpsc::Receiver<ResultEvent> {
    let Some(prefix) = prefix.filter(|p| !p.trim().is_empty()) else {
        return single(ResultEvent::error(NO_URL));
    };
    let prefix = sanitize_url(prefix);

    let entries = match bootstrap::parse(text, options.format)
        .and_then(|entries| bootstrap::check_site(&entries, &prefix).map(|()| entries))
    {
        Ok(entries) => entries,
        Err(e) => return single(e.into()),
    };

    let resolver = UriResolver::for_prefix(&prefix);
    let entries: Vec<_> = entries
        .into_iter()
        .map(|entry| resolver.resolve(entry))
        .collect();
    let expander = PublishExpander::new(options.publish)
        .with_present(entries.iter().map(|entry| entry.uri.as_str()));
    let plans = entries
        .into_iter()
        .map(|entry| expander.expand(entry))
        .collect();

    DispatchPipeline::new(rest, prefix)
        .with_key(options.key)
        .with_concurrency(options.concurrency)
        .spawn(plans)
}

/// Import and collect every event.
pub async fn import_all(
    rest: Arc<dyn Rest>,
    text: &str,
    prefix: Option<&str>,
    options: ImportOptions,
) -> Vec<ResultEvent> {
    let mut rx = import(rest, text, prefix, options);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

/// A channel that yields one event and closes.
fn single(event: ResultEvent) -> mpsc::Receiver<ResultEvent> {
    let (tx, rx) = mpsc::channel(1);
    if tx.try_send(event).is_err() {
        tracing::error!("failed to queue result event");
    }
    rx
}
