//! import::publish
//!
//! Expand entries into write plans, adding published copies on request.
//!
//! # Plans
//!
//! Each entry becomes a [`WritePlan`]: an ordered list of steps executed
//! one after another. A later step only runs when every earlier write
//! succeeded, so a published copy is never written without its base.
//!
//! With publishing enabled, components and pages get a second write to
//! `<uri>@published`. An entry that is itself keyed `@published` gets its
//! unsuffixed ("latest") copy synthesized first, followed by a warning.
//!
//! When the input carries both `<uri>` and `<uri>@published`, each is
//! written once with its own payload and nothing is synthesized.

use std::collections::HashSet;

use crate::core::prefixes::classify;
use crate::core::types::{DispatchEntry, ResourceKind, PUBLISHED_SUFFIX};

/// Warning emitted when latest data is synthesized for a published entry.
pub const GENERATED_LATEST: &str = "Generated latest data for @published item";

/// One step of a write plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Write an entry
    Write(DispatchEntry),
    /// Emit a warning whose details are the URL of `uri`
    Warn { message: &'static str, uri: String },
}

/// Ordered steps for one source entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WritePlan {
    pub steps: Vec<Step>,
}

impl WritePlan {
    /// A plan with a single write.
    pub fn single(entry: DispatchEntry) -> Self {
        Self {
            steps: vec![Step::Write(entry)],
        }
    }

    /// Number of writes in the plan.
    pub fn write_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, Step::Write(_)))
            .count()
    }
}

/// Derives the extra writes publish mode needs.
#[derive(Debug, Clone, Default)]
pub struct PublishExpander {
    publish: bool,
    /// URIs present in the input
    present: HashSet<String>,
}

impl PublishExpander {
    pub fn new(publish: bool) -> Self {
        Self {
            publish,
            present: HashSet::new(),
        }
    }

    /// Record the URIs the input already writes.
    pub fn with_present<I>(mut self, uris: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.present.extend(uris.into_iter().map(Into::into));
        self
    }

    /// Expand one entry into its plan.
    pub fn expand(&self, entry: DispatchEntry) -> WritePlan {
        if !self.publish || classify(&entry.uri) == ResourceKind::Other {
            return WritePlan::single(entry);
        }

        if entry.is_published() {
            let base = &entry.uri[..entry.uri.len() - PUBLISHED_SUFFIX.len()];
            if self.present.contains(base) {
                return WritePlan::single(entry);
            }
            let latest = DispatchEntry::new(base, entry.payload.clone());
            let uri = entry.uri.clone();
            return WritePlan {
                steps: vec![
                    Step::Write(latest),
                    Step::Write(entry),
                    Step::Warn {
                        message: GENERATED_LATEST,
                        uri,
                    },
                ],
            };
        }

        let published_uri = format!("{}{}", entry.uri, PUBLISHED_SUFFIX);
        if self.present.contains(&published_uri) {
            return WritePlan::single(entry);
        }
        let published = DispatchEntry::new(published_uri, entry.payload.clone());
        WritePlan {
            steps: vec![Step::Write(entry), Step::Write(published)],
        }
    }
}
