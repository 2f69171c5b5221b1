//! Evaluates a parsed [`Path`] against a JSON value.
use super::ast::{Path, Segment};
use serde_json::Value;

/// Selects the value at `path`, or `None` when any segment has nothing to
/// select (missing key, index out of bounds, descent into a scalar).
///
/// JSON `null` is a present value and comes back as `Some(Value::Null)`.
pub fn select(path: &Path, data: &Value) -> Option<Value> {
    select_segments(&path.segments, data)
}

fn select_segments(segments: &[Segment], current: &Value) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(current.clone());
    };
    match segment {
        Segment::Key(key) => {
            let next = match current {
                Value::Object(map) => map.get(key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }?;
            select_segments(rest, next)
        }
        Segment::Index(index) => match current {
            Value::Array(items) => select_segments(rest, items.get(*index)?),
            _ => None,
        },
        Segment::Each => {
            let Value::Array(items) = current else {
                return None;
            };
            if rest.is_empty() {
                return Some(Value::from(items.len()));
            }
            // Elements without a match are skipped, so the result may be empty.
            let mapped = items
                .iter()
                .filter_map(|item| select_segments(rest, item))
                .collect();
            Some(Value::Array(mapped))
        }
    }
}
