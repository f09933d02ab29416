//! Merge attribute flattening for template emails.
//!
//! Templates only accept a flat `KEY -> scalar` map. Nested maps are folded
//! into compound keys: `{"b": {"c": "y"}}` becomes `{"B__C": "y"}`.

use crate::error::SendinblueResult;
use serde::Serialize;
use serde_json::{Map, Value};

/// Separator between ancestor keys.
pub const KEY_SEPARATOR: &str = "__";

/// Flatten a nested attribute value.
///
/// Objects and arrays recurse (array items are keyed by index), every other
/// value is a leaf stored under the compound key, upper-cased in ASCII only. Key order
/// follows traversal order and later collisions overwrite earlier ones.
/// A scalar at the top level has no key and yields an empty map.
pub fn flatten_attributes(attributes: &Value) -> Map<String, Value> {
    let mut output = Map::new();
    flatten_into(&mut output, attributes, "");
    output
}

/// Flatten any serializable record through its field map.
pub fn flatten_record<T: Serialize>(record: &T) -> SendinblueResult<Map<String, Value>> {
    let value = serde_json::to_value(record)?;
    Ok(flatten_attributes(&value))
}

fn flatten_into(output: &mut Map<String, Value>, value: &Value, prefix: &str) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_entry(output, prefix, key, value);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_entry(output, prefix, &index.to_string(), value);
            }
        }
        _ => {}
    }
}

fn flatten_entry(output: &mut Map<String, Value>, prefix: &str, key: &str, value: &Value) {
    match value {
        Value::Object(_) | Value::Array(_) => {
            let nested_prefix = format!("{prefix}{key}{KEY_SEPARATOR}");
            flatten_into(output, value, &nested_prefix);
        }
        leaf => {
            output.insert(format!("{prefix}{key}").to_ascii_uppercase(), leaf.clone());
        }
    }
}
