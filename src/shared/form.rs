//! Bracketed form-field naming (`location[coordinates][lat]`).
//!
//! The municipal backend parses multipart bodies with the common
//! "qs"-style convention: nested objects are sent as flat keys with one
//! bracketed segment per nesting level. These helpers convert between a
//! nested JSON value and that flat representation.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    /// Whole field name: a root segment followed by zero or more `[segment]` groups
    /// - Valid: "title", "location[address]", "location[coordinates][lat]"
    /// - Invalid: "[lat]", "location[", "location]x["
    static ref FIELD_NAME_REGEX: Regex =
        Regex::new(r"^([^\[\]]+)((?:\[[^\[\]]+\])*)$").unwrap();

    /// A single bracketed segment
    static ref SEGMENT_REGEX: Regex = Regex::new(r"\[([^\[\]]+)\]").unwrap();
}

/// Flatten a JSON value into `(name, value)` pairs under `prefix`.
///
/// Objects nest as `prefix[key]`, arrays repeat the same name once per item,
/// `null` is omitted and scalars are stringified.
pub fn flatten_bracketed(prefix: &str, value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(prefix, value, &mut out);
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Bool(_) | Value::Number(_) => out.push((prefix.to_string(), value.to_string())),
        Value::Array(items) => {
            for item in items {
                flatten_into(prefix, item, out);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(&format!("{}[{}]", prefix, key), child, out);
            }
        }
    }
}

/// Split a bracketed field name into its path segments.
///
/// Returns `None` for names that do not follow the convention.
pub fn field_path(name: &str) -> Option<Vec<String>> {
    let caps = FIELD_NAME_REGEX.captures(name)?;
    let mut path = vec![caps[1].to_string()];
    path.extend(
        SEGMENT_REGEX
            .captures_iter(&caps[2])
            .map(|c| c[1].to_string()),
    );
    Some(path)
}

/// Rebuild a nested JSON object from flat text fields, the way the backend does.
///
/// Repeated names collect into an array. Malformed names are skipped.
pub fn unflatten_bracketed<'a, I>(fields: I) -> Value
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut root = Map::new();
    for (name, value) in fields {
        match field_path(name) {
            Some(path) => insert_path(&mut root, &path, Value::String(value.to_string())),
            None => tracing::debug!("Skipping malformed form field name: {}", name),
        }
    }
    Value::Object(root)
}

fn insert_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((key, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        match map.get_mut(key) {
            None => {
                map.insert(key.clone(), value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
        return;
    }

    let child = map
        .entry(key.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(child) = child {
        insert_path(child, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_location() {
        let location = json!({
            "address": "Main St",
            "ward": "",
            "coordinates": { "lat": 27.7, "lng": 85.32 }
        });
        let mut flat = flatten_bracketed("location", &location);
        flat.sort();
        assert_eq!(
            flat,
            vec![
                ("location[address]".to_string(), "Main St".to_string()),
                ("location[coordinates][lat]".to_string(), "27.7".to_string()),
                ("location[coordinates][lng]".to_string(), "85.32".to_string()),
                ("location[ward]".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn test_flatten_skips_null() {
        let flat = flatten_bracketed("location", &json!({ "coordinates": null }));
        assert!(flat.is_empty());
    }

    #[test]
    fn test_field_path() {
        assert_eq!(
            field_path("location[coordinates][lat]"),
            Some(vec![
                "location".to_string(),
                "coordinates".to_string(),
                "lat".to_string()
            ])
        );
        assert_eq!(field_path("title"), Some(vec!["title".to_string()]));
        assert_eq!(field_path("[lat]"), None);
        assert_eq!(field_path("location[address"), None);
    }

    #[test]
    fn test_unflatten_rebuilds_nesting_and_repeats() {
        let value = unflatten_bracketed(vec![
            ("title", "Pothole"),
            ("location[address]", "Main St"),
            ("location[coordinates][lat]", "27.7"),
            ("tags", "a"),
            ("tags", "b"),
        ]);
        assert_eq!(
            value,
            json!({
                "title": "Pothole",
                "location": { "address": "Main St", "coordinates": { "lat": "27.7" } },
                "tags": ["a", "b"]
            })
        );
    }
}
