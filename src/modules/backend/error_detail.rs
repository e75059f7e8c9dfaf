//! Turning backend error bodies into user-facing text.

use serde_json::Value;

/// Keys under which the backend reports structured error detail
const DETAIL_KEYS: &[&str] = &["errors", "details"];

/// Flatten the structured error detail of a backend error body into one line per problem.
///
/// Understands arrays of strings, arrays of `{field|path|param, message|msg}`
/// objects, and objects mapping a field to a message or a list of messages.
pub fn flatten_error_detail(body: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    for key in DETAIL_KEYS {
        if let Some(detail) = body.get(key) {
            collect_detail(detail, &mut lines);
        }
    }
    lines
}

fn collect_detail(detail: &Value, lines: &mut Vec<String>) {
    match detail {
        Value::String(s) if !s.trim().is_empty() => lines.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) => {
                        if let Some(line) = object_line(item) {
                            lines.push(line);
                        }
                    }
                    other => collect_detail(other, lines),
                }
            }
        }
        Value::Object(map) => {
            for (field, value) in map {
                match value {
                    Value::String(msg) => lines.push(format!("{}: {}", field, msg)),
                    Value::Array(msgs) => lines.extend(
                        msgs.iter()
                            .filter_map(Value::as_str)
                            .map(|msg| format!("{}: {}", field, msg)),
                    ),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn object_line(item: &Value) -> Option<String> {
    let message = ["message", "msg"]
        .iter()
        .find_map(|k| item.get(k).and_then(Value::as_str))?;

    let field = ["field", "path", "param"]
        .iter()
        .find_map(|k| item.get(k))
        .and_then(|f| match f {
            Value::String(s) => Some(s.clone()),
            Value::Array(parts) => Some(
                parts
                    .iter()
                    .map(|p| match p {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("."),
            ),
            _ => None,
        })
        .filter(|f| !f.is_empty());

    Some(match field {
        Some(field) => format!("{}: {}", field, message),
        None => message.to_string(),
    })
}

/// Build the message shown to the user: a bullet list of detail lines,
/// else the backend's own `message`, else `fallback`.
pub fn user_message(body: &Value, lines: &[String], fallback: &str) -> String {
    if !lines.is_empty() {
        return lines
            .iter()
            .map(|l| format!("• {}", l))
            .collect::<Vec<_>>()
            .join("\n");
    }
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}
