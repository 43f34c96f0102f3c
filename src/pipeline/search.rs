use serde_json::Value;

use crate::extract::{Strategy, array_at, probe_body};

fn wrapped_list(body: &Value) -> Option<Vec<Value>> {
    array_at(body, &["data"])
}

fn direct_list(body: &Value) -> Option<Vec<Value>> {
    body.as_array().cloned()
}

/// Accepted search response shapes, highest priority first.
pub const PRODUCT_LIST_STRATEGIES: [Strategy<Vec<Value>>; 2] = [
    Strategy {
        name: "data",
        probe: wrapped_list,
    },
    Strategy {
        name: "list",
        probe: direct_list,
    },
];

fn entry_id(entry: &Value) -> Option<String> {
    match entry.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_owned()),
        Value::Number(id) => Some(id.to_string()),
        Value::Null
        | Value::Bool(_)
        | Value::String(_)
        | Value::Array(_)
        | Value::Object(_) => None,
    }
}

fn same_name(entry: &Value, wanted: &str) -> bool {
    entry
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.trim().to_lowercase() == wanted)
}

/// Picks the identifier of the entry named `product` (case-insensitive,
/// trimmed), falling back to the first entry. Returns `None` for bodies
/// that are not a recognised list or hold an empty list.
#[must_use]
pub fn select_product_id(body: &str, product: &str) -> Option<String> {
    let (_, list) = probe_body(&PRODUCT_LIST_STRATEGIES, body)?;
    let wanted = product.trim().to_lowercase();
    list.iter()
        .find(|entry| same_name(entry, &wanted))
        .and_then(entry_id)
        .or_else(|| list.first().and_then(entry_id))
}
