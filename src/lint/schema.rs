//! lint::schema
//!
//! Structural checks for a component schema document.
//!
//! A schema is a YAML mapping. It must carry a `_description`, its root
//! property names must be camelCase (a single leading underscore is allowed
//! for reserved names such as `_version`), and every field listed by a
//! `_groups.<group>.fields` entry must be a root property.
//!
//! Checks are independent: every failing check contributes one error event.

use serde_yaml::{Mapping, Value};

use crate::core::types::ResultEvent;

pub const NO_DESCRIPTION: &str = "Schema has no _description";
pub const NOT_CAMEL_CASED: &str = "Properties must be camelCased";
pub const MISSING_GROUP_FIELDS: &str = "Fields referenced by groups don't exist";
pub const VALID: &str = "Schema is valid";

/// Lint one schema document.
pub fn lint_schema(text: &str) -> Vec<ResultEvent> {
    if text.trim().is_empty() {
        return vec![ResultEvent::error(NO_DESCRIPTION)];
    }

    let document: Value = match serde_yaml::from_str(text) {
        Ok(document) => document,
        Err(e) => {
            let message = e.to_string();
            let summary = message.split(':').next().unwrap_or_default();
            return vec![ResultEvent::error(format!("YAML syntax error: {}", summary))];
        }
    };

    let empty = Mapping::new();
    let root = document.as_mapping().unwrap_or(&empty);
    let mut errors = Vec::new();

    if !root.contains_key("_description") {
        errors.push(ResultEvent::error(NO_DESCRIPTION));
    }

    let bad_names: Vec<String> = root
        .keys()
        .map(key_name)
        .filter(|name| !is_camel_cased(name))
        .collect();
    if !bad_names.is_empty() {
        errors.push(ResultEvent::error(NOT_CAMEL_CASED).with_details(bad_names.join("\n")));
    }

    let missing = missing_group_fields(root);
    if !missing.is_empty() {
        errors.push(ResultEvent::error(MISSING_GROUP_FIELDS).with_details(missing.join("\n")));
    }

    if errors.is_empty() {
        tracing::debug!(properties = root.len(), "schema passed all checks");
        vec![ResultEvent::success(VALID)]
    } else {
        errors
    }
}

/// Render a mapping key as a property name.
fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Loose camelCase: letters and digits only, with at most one leading
/// underscore. Capitalization is not checked, so `imageURL` passes.
pub fn is_camel_cased(name: &str) -> bool {
    let body = name.strip_prefix('_').unwrap_or(name);
    !body.is_empty() && body.chars().all(char::is_alphanumeric)
}

/// `<group> » <field>` for every group field that is not a root property.
fn missing_group_fields(root: &Mapping) -> Vec<String> {
    let Some(groups) = root.get("_groups").and_then(Value::as_mapping) else {
        return Vec::new();
    };

    groups
        .iter()
        .flat_map(|(name, group)| {
            let name = key_name(name);
            group
                .get("fields")
                .and_then(Value::as_sequence)
                .into_iter()
                .flatten()
                .map(key_name)
                .filter(|field| !root.contains_key(field.as_str()))
                .map(move |field| format!("{} » {}", name, field))
                .collect::<Vec<_>>()
        })
        .collect()
}
