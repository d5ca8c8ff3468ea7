//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ResultEvent`] - The single unit of output for import and lint
//! - [`EventKind`] - Outcome tag of a result event
//! - [`DispatchEntry`] - A URI and the payload to write there
//! - [`PageUri`] - A public URL resolved to its page URI and site prefix
//! - [`ResourceKind`] - Classification of a URL
//!
//! # Examples
//!
//! ```
//! use claywork::core::types::{EventKind, ResultEvent};
//!
//! let event = ResultEvent::error("http://domain.com/_components/a")
//!     .with_details("not found");
//! assert_eq!(event.kind, EventKind::Error);
//! assert!(event.is_error());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Suffix marking the publicly served copy of a resource.
pub const PUBLISHED_SUFFIX: &str = "@published";

/// Outcome tag of a [`ResultEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The write or check succeeded
    Success,
    /// Succeeded, but something was synthesized or is worth a look
    Warning,
    /// The write or check failed
    Error,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Success => write!(f, "success"),
            EventKind::Warning => write!(f, "warning"),
            EventKind::Error => write!(f, "error"),
        }
    }
}

/// A single outcome reported by import or lint.
///
/// Failures travel as data: every fault a component observes is turned
/// into an `Error` event instead of being propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEvent {
    /// Outcome tag, serialized as `type`
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Usually the fully qualified URL the event is about
    pub message: String,
    /// Extra context (offending snippet, list of violations, related URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ResultEvent {
    /// Create an event of the given kind.
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Create a success event.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(EventKind::Success, message)
    }

    /// Create a warning event.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(EventKind::Warning, message)
    }

    /// Create an error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventKind::Error, message)
    }

    /// Attach details to the event.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Check if this event reports a failure.
    pub fn is_error(&self) -> bool {
        self.kind == EventKind::Error
    }
}

/// A URI and the payload to write there.
///
/// `uri` is either site-relative (`/_components/a`) or host-qualified
/// (`domain.com/_components/a`).
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEntry {
    pub uri: String,
    pub payload: Value,
}

impl DispatchEntry {
    pub fn new(uri: impl Into<String>, payload: Value) -> Self {
        Self {
            uri: uri.into(),
            payload,
        }
    }

    /// Check if the URI targets the published copy.
    pub fn is_published(&self) -> bool {
        self.uri.ends_with(PUBLISHED_SUFFIX)
    }
}

/// Result of resolving a public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUri {
    /// Page URI, e.g. `domain.com/_pages/foo`
    pub uri: String,
    /// Site prefix the page lives under, e.g. `http://domain.com`
    pub prefix: String,
}

/// What a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Component default or instance (`/_components/`)
    Component,
    /// Page (`/_pages/`)
    Page,
    /// Anything else, treated as a public URL
    Other,
}
