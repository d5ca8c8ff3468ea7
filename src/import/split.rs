//! import::split
//!
//! Text preprocessing shared by the JSON and YAML code paths.
//!
//! Both splitters hand back slices of the input, so error details always
//! quote the text exactly as it was given.
//!
//! # Markers
//!
//! `tail -n +1 a.yml b.yml` separates files with header lines of the form
//! `==> name <==`. Input containing such lines is split into one document
//! per file; the marker lines themselves are dropped.
//!
//! # Repeated YAML roots
//!
//! Concatenating bootstrap files without `---` produces text where a root
//! key such as `_components:` appears more than once. A YAML parser
//! rejects that, so [`split_yaml_documents`] starts a new chunk at every
//! repeated root key. Explicit `---` and `...` boundaries stay inside the
//! chunk for the YAML parser's own multi-document stream.

use std::collections::HashSet;

const MARKER_OPEN: &str = "==> ";
const MARKER_CLOSE: &str = " <==";

/// Check if a line is a `==> name <==` file marker.
fn is_marker(line: &str) -> bool {
    let line = line.trim_end();
    line.starts_with(MARKER_OPEN) && line.ends_with(MARKER_CLOSE)
}

/// Check if a line starts or ends a YAML document (`---`, `--- !tag`, `...`).
fn is_document_boundary(line: &str) -> bool {
    ["---", "..."].iter().any(|mark| {
        line.strip_prefix(mark)
            .map_or(false, |rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

/// Split input into independent documents at `==> name <==` markers.
///
/// Input without markers comes back untouched as a single document. Blank
/// documents are dropped.
pub fn split_documents(text: &str) -> Vec<&str> {
    let mut documents = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if is_marker(line) {
            documents.push(&text[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    documents.push(&text[start..]);

    documents.retain(|doc| !doc.trim().is_empty());
    documents
}

/// Extract the key of a root-level YAML mapping entry, if the line has one.
fn root_key(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    if first.is_whitespace() || matches!(first, '#' | '-' | '.' | '{' | '[' | '}' | ']') {
        return None;
    }

    let trimmed = line.trim_end();
    let end = trimmed
        .find(": ")
        .or_else(|| trimmed.strip_suffix(':').map(|key| key.len()))?;
    Some(&trimmed[..end])
}

/// Split YAML text into chunks at repeated root keys.
///
/// A document boundary resets the set of seen keys without splitting.
pub fn split_yaml_documents(text: &str) -> Vec<&str> {
    let mut documents = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if is_document_boundary(line.trim_end()) {
            seen.clear();
        } else if let Some(key) = root_key(line) {
            if !seen.insert(key) {
                tracing::debug!(key, "repeated root key, starting a new document");
                documents.push(&text[start..offset]);
                start = offset;
                seen.clear();
                seen.insert(key);
            }
        }
        offset += line.len();
    }
    documents.push(&text[start..]);

    documents.retain(|doc| !doc.trim().is_empty());
    documents
}
