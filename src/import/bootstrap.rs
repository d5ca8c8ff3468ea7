//! import::bootstrap
//!
//! Parse import input into a flat list of dispatch entries.
//!
//! # Formats
//!
//! - **Dispatch** (default): JSON objects whose keys are already URIs,
//!   e.g. `{"/_components/a": {"b": "c"}}`. Several objects may be
//!   concatenated.
//! - **Bootstrap** (`--yaml`): nested YAML keyed by namespace:
//!
//! ```yaml
//! _components:
//!   article:                 # component defaults -> /_components/article
//!     title: Untitled
//!     instances:
//!       foo:                 # -> /_components/article/instances/foo
//!         title: My Article
//! _pages:
//!   index:                   # -> /_pages/index
//!     layout: /_components/layout/instances/main
//! _uris:
//!   /about: /_pages/about    # -> /_uris/about
//! _lists:
//!   tags: []                 # -> /_lists/tags
//! ```
//!
//! # Merging
//!
//! All documents are deep-merged in input order before flattening: disjoint
//! keys are unioned and overlapping leaf values take the later document's
//! value. Entry URIs are therefore unique.
//!
//! # Example
//!
//! ```
//! use claywork::import::bootstrap::{parse, InputFormat};
//!
//! let entries = parse("_components:\n  a:\n    b: c\n", InputFormat::Bootstrap).unwrap();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].uri, "/_components/a");
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::split::{split_documents, split_yaml_documents};
use crate::core::prefixes::is_under_site;
use crate::core::types::{DispatchEntry, ResultEvent};

/// Namespaces that mark a document as bootstrap-shaped.
const BOOTSTRAP_ROOTS: &[&str] = &["_components", "_pages", "_uris", "_lists"];

const MISMATCH_HINT: &str = "Please use the --yaml argument to import from bootstraps";

/// How import input should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Flat JSON keyed by URI
    #[default]
    Dispatch,
    /// Nested YAML keyed by namespace
    Bootstrap,
}

/// Errors that stop an import before anything is written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input is not valid JSON/YAML.
    #[error("{message}")]
    Format { message: String, details: String },

    /// The input is valid, but in the other format.
    #[error("{message}")]
    Mismatch { message: String, details: String },
}

impl From<ParseError> for ResultEvent {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Format { message, details } | ParseError::Mismatch { message, details } => {
                ResultEvent::error(message).with_details(details)
            }
        }
    }
}

/// Parse import input into dispatch entries.
///
/// # Errors
///
/// Returns `ParseError::Format` on syntax errors and `ParseError::Mismatch`
/// when the input is in the other format than the one requested.
pub fn parse(text: &str, format: InputFormat) -> Result<Vec<DispatchEntry>, ParseError> {
    let mut merged = Map::new();

    for document in split_documents(text) {
        let objects = match format {
            InputFormat::Dispatch => parse_dispatch(document)?,
            InputFormat::Bootstrap => parse_bootstrap(document)?,
        };
        for object in objects {
            deep_merge(&mut merged, object);
        }
    }

    let entries = match format {
        InputFormat::Dispatch => merged
            .into_iter()
            .map(|(uri, payload)| DispatchEntry::new(uri, payload))
            .collect(),
        InputFormat::Bootstrap => flatten_bootstrap(merged)?,
    };

    tracing::debug!(count = entries.len(), ?format, "flattened input");
    Ok(entries)
}

/// Reject entries whose keys would land outside the site at `prefix`.
///
/// # Errors
///
/// Returns `ParseError::Format` naming the first offending key.
pub fn check_site(entries: &[DispatchEntry], prefix: &str) -> Result<(), ParseError> {
    match entries.iter().find(|entry| !is_under_site(prefix, &entry.uri)) {
        Some(entry) => Err(ParseError::Format {
            message: format!("Cannot import {} outside of {}", entry.uri, prefix),
            details: "Keys must be site-relative (/_components/...) or name the target site"
                .to_string(),
        }),
        None => Ok(()),
    }
}

/// Parse one document as concatenated JSON objects.
fn parse_dispatch(document: &str) -> Result<Vec<Map<String, Value>>, ParseError> {
    let mut objects = Vec::new();

    for value in serde_json::Deserializer::from_str(document).into_iter::<Value>() {
        match value {
            Ok(Value::Object(object)) => {
                if object.keys().any(|k| BOOTSTRAP_ROOTS.contains(&k.as_str())) {
                    return Err(ParseError::Mismatch {
                        message: "Cannot import bootstrap as dispatch".to_string(),
                        details: MISMATCH_HINT.to_string(),
                    });
                }
                objects.push(object);
            }
            Ok(_) => {
                return Err(ParseError::Format {
                    message: "Dispatch must be an object keyed by uri".to_string(),
                    details: document.to_string(),
                })
            }
            Err(err) => {
                if serde_yaml::from_str::<serde_yaml::Value>(document).is_ok() {
                    return Err(ParseError::Mismatch {
                        message: "Cannot import dispatch from yaml".to_string(),
                        details: MISMATCH_HINT.to_string(),
                    });
                }
                return Err(json_syntax_error(document, &err));
            }
        }
    }

    Ok(objects)
}

/// Describe a JSON syntax error by the offending token and its position.
fn json_syntax_error(document: &str, err: &serde_json::Error) -> ParseError {
    let offset = document
        .split_inclusive('\n')
        .take(err.line().saturating_sub(1))
        .map(str::len)
        .sum::<usize>()
        + err.column().saturating_sub(1);

    let token = match err.classify() {
        serde_json::error::Category::Eof => None,
        _ => document.get(offset..).and_then(|rest| rest.chars().next()),
    };

    let message = match token {
        Some(token) => format!(
            "JSON syntax error: Unexpected token {} in JSON at position {}",
            token, offset
        ),
        None => "JSON syntax error: Unexpected end of JSON input".to_string(),
    };

    ParseError::Format {
        message,
        details: document.to_string(),
    }
}

/// Parse one document as a YAML stream, splitting at repeated root keys.
fn parse_bootstrap(document: &str) -> Result<Vec<Map<String, Value>>, ParseError> {
    let mut objects = Vec::new();

    for chunk in split_yaml_documents(document) {
        for yaml in serde_yaml::Deserializer::from_str(chunk) {
            let value = serde_yaml::Value::deserialize(yaml).map_err(|e| ParseError::Format {
                message: format!("YAML syntax error: {}", e),
                details: chunk.to_string(),
            })?;

            match yaml_to_json(value) {
                Value::Object(object) => objects.push(object),
                Value::Null => {}
                _ => {
                    return Err(ParseError::Format {
                        message: "Bootstrap must be a mapping".to_string(),
                        details: chunk.to_string(),
                    })
                }
            }
        }
    }

    Ok(objects)
}

/// Convert YAML to JSON, stringifying non-string keys.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match yaml_to_json(key) {
        Value::String(s) => s,
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Merge `source` into `target`; nested objects merge, everything else is replaced.
pub fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming)
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Flatten a merged bootstrap into URI-keyed entries.
fn flatten_bootstrap(root: Map<String, Value>) -> Result<Vec<DispatchEntry>, ParseError> {
    let mut flat = Map::new();

    for (namespace, value) in root {
        if namespace.starts_with('/') {
            flat.insert(namespace, value);
            continue;
        }
        if !BOOTSTRAP_ROOTS.contains(&namespace.as_str()) {
            tracing::warn!(key = %namespace, "ignoring unknown bootstrap root");
            continue;
        }

        let items = match value {
            Value::Object(items) => items,
            Value::Null => continue,
            other => {
                return Err(ParseError::Format {
                    message: format!("Bootstrap {} must be a mapping", namespace),
                    details: other.to_string(),
                })
            }
        };

        for (name, data) in items {
            let name = name.trim_start_matches('/');
            match namespace.as_str() {
                "_components" => flatten_component(name, data, &mut flat),
                _ => {
                    flat.insert(format!("/{}/{}", namespace, name), data);
                }
            }
        }
    }

    Ok(flat
        .into_iter()
        .map(|(uri, payload)| DispatchEntry::new(uri, payload))
        .collect())
}

/// Flatten one component: defaults (when present) and each instance.
fn flatten_component(name: &str, data: Value, flat: &mut Map<String, Value>) {
    let Value::Object(mut defaults) = data else {
        tracing::warn!(component = name, "ignoring component without data");
        return;
    };

    let instances = defaults.remove("instances");
    let base = format!("/_components/{}", name);

    if !defaults.is_empty() {
        flat.insert(base.clone(), Value::Object(defaults));
    }

    if let Some(Value::Object(instances)) = instances {
        for (id, instance) in instances {
            flat.insert(format!("{}/instances/{}", base, id), instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uris(entries: &[DispatchEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.uri.as_str()).collect()
    }

    mod bootstrap {
        use super::*;

        #[test]
        fn component_defaults() {
            let entries = parse("_components:\n  a:\n    b: c\n", InputFormat::Bootstrap).unwrap();
            assert_eq!(entries, vec![DispatchEntry::new("/_components/a", json!({ "b": "c" }))]);
        }

        #[test]
        fn instances_without_defaults() {
            let text = "_components:\n  a:\n    instances:\n      b@published:\n        c: d\n";
            let entries = parse(text, InputFormat::Bootstrap).unwrap();
            assert_eq!(uris(&entries), vec!["/_components/a/instances/b@published"]);
            assert_eq!(entries[0].payload, json!({ "c": "d" }));
        }

        #[test]
        fn defaults_and_instances() {
            let text = "\
_components:
  article:
    title: Untitled
    instances:
      foo:
        title: My Article
        content:
          - _ref: /_components/paragraph/instances/bar
  paragraph:
    instances:
      bar:
        text: hello world
";
            let entries = parse(text, InputFormat::Bootstrap).unwrap();
            assert_eq!(
                uris(&entries),
                vec![
                    "/_components/article",
                    "/_components/article/instances/foo",
                    "/_components/paragraph/instances/bar"
                ]
            );
            assert_eq!(
                entries[1].payload["content"][0]["_ref"],
                "/_components/paragraph/instances/bar"
            );
        }

        #[test]
        fn pages_uris_and_lists() {
            let text = "\
_pages:
  index:
    layout: /_components/layout/instances/main
_uris:
  /about: /_pages/about
_lists:
  tags:
    - text: news
";
            let entries = parse(text, InputFormat::Bootstrap).unwrap();
            assert_eq!(
                uris(&entries),
                vec!["/_pages/index", "/_uris/about", "/_lists/tags"]
            );
            assert_eq!(entries[1].payload, json!("/_pages/about"));
        }

        #[test]
        fn numeric_keys_stringified() {
            let text = "_components:\n  a:\n    instances:\n      1:\n        b: c\n";
            let entries = parse(text, InputFormat::Bootstrap).unwrap();
            assert_eq!(uris(&entries), vec!["/_components/a/instances/1"]);
        }

        #[test]
        fn concatenated_documents_union() {
            let text = "_components:\n  a:\n    b: c\n_components:\n  b:\n    c: d\n";
            let entries = parse(text, InputFormat::Bootstrap).unwrap();
            assert_eq!(uris(&entries), vec!["/_components/a", "/_components/b"]);
        }

        #[test]
        fn later_document_wins_on_overlap() {
            let text = "_components:\n  a:\n    b: c\n    x: 1\n---\n_components:\n  a:\n    b: d\n";
            let entries = parse(text, InputFormat::Bootstrap).unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].payload, json!({ "b": "d", "x": 1 }));
        }

        #[test]
        fn separators_with_comments_and_end_markers() {
            let text = "--- # first\n_components:\n  a:\n    b: c\n...\n--- !bootstrap\n_components:\n  b:\n    c: d\n";
            let entries = parse(text, InputFormat::Bootstrap).unwrap();
            assert_eq!(uris(&entries), vec!["/_components/a", "/_components/b"]);
        }

        #[test]
        fn marker_separated_files() {
            let text = "\n==> ../path/to/doc1.yml <==\n_components:\n  a:\n    b: c\n\n==> ../path/to/doc2.yml <==\n_components:\n  b:\n    c: d\n";
            let entries = parse(text, InputFormat::Bootstrap).unwrap();
            assert_eq!(uris(&entries), vec!["/_components/a", "/_components/b"]);
        }

        #[test]
        fn dispatch_shaped_yaml_passes_through() {
            let entries =
                parse("/_components/a:\n  b: c\n", InputFormat::Bootstrap).unwrap();
            assert_eq!(uris(&entries), vec!["/_components/a"]);
        }

        #[test]
        fn syntax_error() {
            let err = parse("a: hi\na", InputFormat::Bootstrap).unwrap_err();
            match err {
                ParseError::Format { message, details } => {
                    assert!(message.starts_with("YAML syntax error: "));
                    assert_eq!(details, "a: hi\na");
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    mod dispatch {
        use super::*;

        #[test]
        fn passes_entries_through() {
            let entries = parse(r#"{"/_components/a":{"b":"c"}}"#, InputFormat::Dispatch).unwrap();
            assert_eq!(entries, vec![DispatchEntry::new("/_components/a", json!({ "b": "c" }))]);
        }

        #[test]
        fn concatenated_objects() {
            let text = "{\"/_components/a\":{\"b\":\"c\"}}\n{\"/_components/b\":{\"c\":\"d\"}}\n";
            let entries = parse(text, InputFormat::Dispatch).unwrap();
            assert_eq!(uris(&entries), vec!["/_components/a", "/_components/b"]);
        }

        #[test]
        fn bad_json_reports_token_and_position() {
            let err = parse(r#"]{"a":}"#, InputFormat::Dispatch).unwrap_err();
            assert_eq!(
                err,
                ParseError::Format {
                    message: "JSON syntax error: Unexpected token ] in JSON at position 0"
                        .to_string(),
                    details: "]{\"a\":}".to_string(),
                }
            );
        }

        #[test]
        fn truncated_json() {
            let err = parse(r#"{"a":"#, InputFormat::Dispatch).unwrap_err();
            assert_eq!(
                err.to_string(),
                "JSON syntax error: Unexpected end of JSON input"
            );
        }

        #[test]
        fn yaml_without_flag() {
            let err = parse("abc", InputFormat::Dispatch).unwrap_err();
            assert_eq!(
                ResultEvent::from(err),
                ResultEvent::error("Cannot import dispatch from yaml")
                    .with_details("Please use the --yaml argument to import from bootstraps")
            );
        }

        #[test]
        fn bootstrap_json_without_flag() {
            let err = parse(r#"{"_components":{"a":{"b":"c"}}}"#, InputFormat::Dispatch)
                .unwrap_err();
            assert!(matches!(err, ParseError::Mismatch { .. }));
        }

        #[test]
        fn non_object_rejected() {
            let err = parse("[1, 2]", InputFormat::Dispatch).unwrap_err();
            assert!(matches!(err, ParseError::Format { .. }));
        }
    }

    #[test]
    fn keys_outside_site_rejected() {
        let entries = parse(r#"{"foo":{},"/_components/a":{}}"#, InputFormat::Dispatch).unwrap();
        let err = check_site(&entries, "http://domain.com").unwrap_err();
        assert_eq!(err.to_string(), "Cannot import foo outside of http://domain.com");

        let entries =
            parse(r#"{"domain.com/_components/a":{}}"#, InputFormat::Dispatch).unwrap();
        assert!(check_site(&entries, "http://domain.com").is_ok());
    }

    #[test]
    fn deep_merge_unions_and_overrides() {
        let mut target = json!({ "a": { "b": 1, "c": 2 }, "x": [1] })
            .as_object()
            .cloned()
            .unwrap();
        let source = json!({ "a": { "c": 3, "d": 4 }, "x": [2], "y": true })
            .as_object()
            .cloned()
            .unwrap();

        deep_merge(&mut target, source);
        assert_eq!(
            Value::Object(target),
            json!({ "a": { "b": 1, "c": 3, "d": 4 }, "x": [2], "y": true })
        );
    }
}
