//! import::dispatch
//!
//! Bounded-concurrency execution of write plans.
//!
//! # Design
//!
//! A coordinator task drains the plan queue into a `JoinSet` holding at
//! most `concurrency` plans. A plan runs its writes sequentially, so each
//! in-flight plan accounts for at most one outstanding request and the
//! bound covers published copies too.
//!
//! Events are delivered over an mpsc channel. A consumer may drop the
//! receiver at any point; the coordinator then stops starting new plans
//! and detaches the ones in flight, whose results are ignored.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use claywork::core::types::{DispatchEntry, ResultEvent};
//! use claywork::import::dispatch::DispatchPipeline;
//! use claywork::import::publish::WritePlan;
//! use claywork::rest::mock::MockRest;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let rest = Arc::new(MockRest::new());
//! let events = DispatchPipeline::new(rest, "http://domain.com")
//!     .with_concurrency(4)
//!     .run(vec![WritePlan::single(DispatchEntry::new("/_components/a", json!({ "b": "c" })))])
//!     .await;
//!
//! assert_eq!(events, vec![ResultEvent::success("http://domain.com/_components/a")]);
//! # });
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::publish::{Step, WritePlan};
use crate::core::config::MAX_CONCURRENCY;
use crate::core::prefixes::uri_to_url;
use crate::core::types::ResultEvent;
use crate::rest::Rest;

/// Writes plans against one site with a bound on concurrent requests.
#[derive(Clone)]
pub struct DispatchPipeline {
    rest: Arc<dyn Rest>,
    /// Site prefix, e.g. `http://domain.com`
    prefix: String,
    /// Write credential
    key: Option<String>,
    /// Maximum plans (and therefore writes) in flight
    concurrency: usize,
}

impl std::fmt::Debug for DispatchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPipeline")
            .field("rest", &self.rest.name())
            .field("prefix", &self.prefix)
            .field("has_key", &self.key.is_some())
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl DispatchPipeline {
    /// Create a pipeline writing under `prefix`, one request at a time.
    pub fn new(rest: Arc<dyn Rest>, prefix: impl Into<String>) -> Self {
        Self {
            rest,
            prefix: prefix.into(),
            key: None,
            concurrency: 1,
        }
    }

    /// Set the write credential.
    pub fn with_key(mut self, key: Option<String>) -> Self {
        self.key = key;
        self
    }

    /// Set the concurrency bound, clamped to `1..=MAX_CONCURRENCY`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Start executing plans; events arrive in completion order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, plans: Vec<WritePlan>) -> mpsc::Receiver<ResultEvent> {
        let (tx, rx) = mpsc::channel(self.concurrency * 2);
        tokio::spawn(self.coordinate(plans, tx));
        rx
    }

    /// Execute all plans and collect their events.
    pub async fn run(self, plans: Vec<WritePlan>) -> Vec<ResultEvent> {
        let mut rx = self.spawn(plans);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    async fn coordinate(self, plans: Vec<WritePlan>, tx: mpsc::Sender<ResultEvent>) {
        let mut queue = plans.into_iter();
        let mut in_flight = JoinSet::new();

        loop {
            while in_flight.len() < self.concurrency {
                let Some(plan) = queue.next() else { break };
                in_flight.spawn(execute(
                    Arc::clone(&self.rest),
                    self.prefix.clone(),
                    self.key.clone(),
                    plan,
                ));
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let events = joined.unwrap_or_else(|e| {
                tracing::error!(error = %e, "write task failed");
                vec![ResultEvent::error(format!("write task failed: {}", e))]
            });

            for event in events {
                if tx.send(event).await.is_err() {
                    tracing::debug!("event consumer went away, abandoning remaining writes");
                    in_flight.detach_all();
                    return;
                }
            }
        }
    }
}

/// Run one plan's steps in order, stopping at the first failed write.
async fn execute(
    rest: Arc<dyn Rest>,
    prefix: String,
    key: Option<String>,
    plan: WritePlan,
) -> Vec<ResultEvent> {
    let mut events = Vec::with_capacity(plan.steps.len());

    for step in plan.steps {
        match step {
            Step::Write(entry) => {
                let url = uri_to_url(&prefix, &entry.uri);
                tracing::debug!(url = %url, "writing");
                match rest.put(&url, &entry.payload, key.as_deref()).await {
                    Ok(()) => events.push(ResultEvent::success(url)),
                    Err(e) => {
                        tracing::debug!(error = %e, "write failed");
                        events.push(ResultEvent::error(e.url()).with_details(e.to_string()));
                        break;
                    }
                }
            }
            Step::Warn { message, uri } => {
                events.push(ResultEvent::warning(message).with_details(uri_to_url(&prefix, &uri)))
            }
        }
    }

    events
}
