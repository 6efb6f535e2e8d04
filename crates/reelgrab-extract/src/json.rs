// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Depth-bounded key search over arbitrary JSON trees.
//!
//! Platform payloads bury media URLs at shifting depths, so strategies look
//! for a field by name instead of by path once the known paths fail.

use serde_json::Value;

/// Nesting depth beyond which the walk gives up.
pub const MAX_DEPTH: usize = 48;

/// First value stored under `key`, at any depth, pre-order.
pub fn deep_find<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    find_value(value, key, 0)
}

fn find_value<'a>(value: &'a Value, key: &str, depth: usize) -> Option<&'a Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|v| find_value(v, key, depth + 1))),
        Value::Array(items) => items.iter().find_map(|v| find_value(v, key, depth + 1)),
        _ => None,
    }
}

/// First string value stored under `key`. Non-string matches are skipped.
pub fn deep_find_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    let mut found = Vec::with_capacity(1);
    collect_strings(value, key, 0, 1, &mut found);
    found.into_iter().next()
}

/// Every string value stored under `key`, in document order.
pub fn deep_find_all<'a>(value: &'a Value, key: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    collect_strings(value, key, 0, usize::MAX, &mut found);
    found
}

fn collect_strings<'a>(
    value: &'a Value,
    key: &str,
    depth: usize,
    limit: usize,
    out: &mut Vec<&'a str>,
) {
    if depth > MAX_DEPTH || out.len() >= limit {
        return;
    }
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if out.len() >= limit {
                    return;
                }
                if k == key
                    && let Value::String(s) = v
                {
                    out.push(s);
                    continue;
                }
                collect_strings(v, key, depth + 1, limit, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_strings(v, key, depth + 1, limit, out);
            }
        }
        _ => {}
    }
}

/// String at a JSON pointer such as `/data/images/orig/url`.
pub fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}
