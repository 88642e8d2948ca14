// src/standardize/limiter.rs

use serde_json::Value;

/// Result of capping a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Limited<T> {
    pub items: Vec<T>,
    pub is_truncated: bool,
    /// Length before truncation.
    pub original_count: usize,
}

/// Keep the first `max_items` elements in order. A limit of zero or below
/// means "no limit".
pub fn limit<T>(mut items: Vec<T>, max_items: i64) -> Limited<T> {
    let original = items.len();
    if max_items <= 0 || original as u64 <= max_items as u64 {
        return Limited {
            items,
            is_truncated: false,
            original_count: original,
        };
    }

    items.truncate(max_items as usize);
    Limited {
        items,
        is_truncated: true,
        original_count: original,
    }
}

/// What limiting did to a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitInfo {
    pub is_truncated: bool,
    /// Only set when something was dropped.
    pub original_count: Option<usize>,
    /// Set when the document is list-shaped.
    pub result_count: Option<usize>,
}

/// Apply [`limit`] to a list-shaped document: a top-level array, or an
/// object carrying an `items` array. Other documents pass through untouched.
pub fn limit_value(data: Value, max_items: i64) -> (Value, LimitInfo) {
    match data {
        Value::Array(items) => {
            let limited = limit(items, max_items);
            let info = info_for(&limited);
            (Value::Array(limited.items), info)
        }
        Value::Object(mut map) => {
            let info = match map.remove("items") {
                Some(Value::Array(items)) => {
                    let limited = limit(items, max_items);
                    let info = info_for(&limited);
                    map.insert("items".to_string(), Value::Array(limited.items));
                    info
                }
                Some(other) => {
                    map.insert("items".to_string(), other);
                    LimitInfo::default()
                }
                None => LimitInfo::default(),
            };
            (Value::Object(map), info)
        }
        other => (other, LimitInfo::default()),
    }
}

fn info_for<T>(limited: &Limited<T>) -> LimitInfo {
    LimitInfo {
        is_truncated: limited.is_truncated,
        original_count: limited.is_truncated.then_some(limited.original_count),
        result_count: Some(limited.items.len()),
    }
}
