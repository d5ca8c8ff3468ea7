//! lint::graph
//!
//! Recursive reachability check of a component/page reference graph.
//!
//! # Algorithm
//!
//! Every node is checked the same way:
//!
//! 1. **Quick check**: read the composed `<url>.json`. Composition only
//!    succeeds when every transitive child resolves, so success ends the
//!    check for the whole subtree.
//! 2. **Deep check**: read the raw `<url>`. Failure is an error event for
//!    this node only. Success is a success event, and each direct child
//!    reference is queued for its own check.
//!
//! Public URLs are first resolved to their page, which is then checked.
//!
//! # Concurrency
//!
//! A coordinator owns the work queue and a visited set keyed by canonical
//! URL, so cyclic or shared references are checked once and the run always
//! terminates. It keeps at most `concurrency` checks in flight and starts at
//! most `concurrency` checks per rate-limit window.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use claywork::core::types::ResultEvent;
//! use claywork::lint::graph::GraphValidator;
//! use claywork::rest::mock::MockRest;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let rest = Arc::new(
//!     MockRest::new().with_resource("http://domain.com/_components/a.json", json!({})),
//! );
//! let events = GraphValidator::new(rest)
//!     .lint_all("http://domain.com/_components/a")
//!     .await;
//!
//! assert_eq!(events, vec![ResultEvent::success("http://domain.com/_components/a")]);
//! # });
//! ```

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::throttle::{Throttle, DEFAULT_WINDOW};
use crate::core::config::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use crate::core::prefixes::{classify, strip_scheme, uri_to_url, url_to_prefix};
use crate::core::types::{ResourceKind, ResultEvent};
use crate::rest::Rest;

const REF_PROP: &str = "_ref";

/// How a queued node is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Component,
    Page,
    PublicUrl,
}

/// A queued check.
#[derive(Debug, Clone)]
struct Node {
    url: String,
    prefix: String,
    kind: NodeKind,
}

/// Events for one node plus the children it discovered.
#[derive(Debug, Default)]
struct Outcome {
    events: Vec<ResultEvent>,
    children: Vec<Node>,
}

/// Validates that everything reachable from a URL exists.
#[derive(Clone)]
pub struct GraphValidator {
    rest: Arc<dyn Rest>,
    concurrency: usize,
    window: Duration,
}

impl std::fmt::Debug for GraphValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphValidator")
            .field("rest", &self.rest.name())
            .field("concurrency", &self.concurrency)
            .field("window", &self.window)
            .finish()
    }
}

impl GraphValidator {
    pub fn new(rest: Arc<dyn Rest>) -> Self {
        Self {
            rest,
            concurrency: DEFAULT_CONCURRENCY,
            window: DEFAULT_WINDOW,
        }
    }

    /// Set the concurrency bound and per-window start limit, clamped to
    /// `1..=MAX_CONCURRENCY`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Set the rate-limit window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Start validating from `url`; events arrive in completion order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn lint(&self, url: &str) -> mpsc::Receiver<ResultEvent> {
        let kind = match classify(url) {
            ResourceKind::Component => NodeKind::Component,
            ResourceKind::Page => NodeKind::Page,
            ResourceKind::Other => NodeKind::PublicUrl,
        };
        let root = Node {
            url: url.to_string(),
            prefix: url_to_prefix(url),
            kind,
        };

        let (tx, rx) = mpsc::channel(self.concurrency * 2);
        tokio::spawn(self.clone().coordinate(root, tx));
        rx
    }

    /// Validate and collect every event.
    pub async fn lint_all(&self, url: &str) -> Vec<ResultEvent> {
        let mut rx = self.lint(url);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    async fn coordinate(self, root: Node, tx: mpsc::Sender<ResultEvent>) {
        let mut visited = HashSet::from([canonical(&root.url)]);
        let mut queue = VecDeque::from([root]);
        let mut throttle = Throttle::new(self.concurrency, self.window);
        let mut in_flight = JoinSet::new();

        loop {
            while in_flight.len() < self.concurrency {
                let Some(node) = queue.pop_front() else { break };
                throttle.acquire().await;
                in_flight.spawn(check(Arc::clone(&self.rest), node));
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let outcome = joined.unwrap_or_else(|e| {
                tracing::error!(error = %e, "check task failed");
                Outcome {
                    events: vec![ResultEvent::error(format!("check task failed: {}", e))],
                    children: Vec::new(),
                }
            });

            for child in outcome.children {
                if visited.insert(canonical(&child.url)) {
                    queue.push_back(child);
                } else {
                    tracing::debug!(url = %child.url, "already checked, skipping");
                }
            }

            for event in outcome.events {
                if tx.send(event).await.is_err() {
                    tracing::debug!("event consumer went away, abandoning remaining checks");
                    in_flight.detach_all();
                    return;
                }
            }
        }
    }
}

/// Canonical form used for the visited set: no scheme, no trailing slash.
fn canonical(url: &str) -> String {
    strip_scheme(url).trim_end_matches('/').to_string()
}

/// Check one node.
async fn check(rest: Arc<dyn Rest>, node: Node) -> Outcome {
    match node.kind {
        NodeKind::PublicUrl => check_public_url(rest.as_ref(), node).await,
        NodeKind::Component | NodeKind::Page => check_node(rest.as_ref(), node).await,
    }
}

async fn check_public_url(rest: &dyn Rest, node: Node) -> Outcome {
    match rest.find_uri(&node.url).await {
        Ok(page) => Outcome {
            events: vec![ResultEvent::success(&node.url)],
            children: vec![Node {
                url: uri_to_url(&page.prefix, &page.uri),
                prefix: page.prefix,
                kind: NodeKind::Page,
            }],
        },
        Err(e) => Outcome {
            events: vec![ResultEvent::error(e.url())],
            children: Vec::new(),
        },
    }
}

async fn check_node(rest: &dyn Rest, node: Node) -> Outcome {
    if rest.get(&format!("{}.json", node.url)).await.is_ok() {
        tracing::debug!(url = %node.url, "composed data resolves");
        return Outcome {
            events: vec![ResultEvent::success(&node.url)],
            children: Vec::new(),
        };
    }

    let data = match rest.get(&node.url).await {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!(error = %e, "node unreachable");
            return Outcome {
                events: vec![ResultEvent::error(e.url())],
                children: Vec::new(),
            };
        }
    };

    let references = match node.kind {
        NodeKind::Page => page_references(&data),
        _ => component_references(&data),
    };
    tracing::debug!(url = %node.url, children = references.len(), "checking children");

    Outcome {
        events: vec![ResultEvent::success(&node.url)],
        children: references
            .into_iter()
            .map(|uri| Node {
                url: uri_to_url(&node.prefix, &uri),
                prefix: node.prefix.clone(),
                kind: NodeKind::Component,
            })
            .collect(),
    }
}

/// The `_ref` of an object, if it has one.
fn ref_of(value: &Value) -> Option<String> {
    value.get(REF_PROP)?.as_str().map(str::to_string)
}

/// Direct references of a component: component lists and component properties.
pub fn component_references(data: &Value) -> Vec<String> {
    let Some(object) = data.as_object() else {
        return Vec::new();
    };

    object
        .values()
        .flat_map(|value| -> Vec<String> {
            match value {
                Value::Array(items) => items.iter().filter_map(ref_of).collect(),
                Value::Object(_) => ref_of(value).into_iter().collect(),
                _ => Vec::new(),
            }
        })
        .collect()
}

/// Direct references of a page: its layout and every area's entries.
pub fn page_references(data: &Value) -> Vec<String> {
    let Some(object) = data.as_object() else {
        return Vec::new();
    };

    let layout = object
        .get("layout")
        .and_then(Value::as_str)
        .map(str::to_string);

    let areas = object.values().filter_map(Value::as_array).flat_map(|items| {
        items.iter().filter_map(|item| match item {
            Value::String(uri) => Some(uri.clone()),
            other => ref_of(other),
        })
    });

    layout.into_iter().chain(areas).collect()
}
