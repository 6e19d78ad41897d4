//! Constraint matching, sorting and dot-path updates for the in-memory backend.

use std::cmp::Ordering;

use serde_json::{Map, Value};
use strata_storage::{FindQuery, SortKey};

/// Returns `true` if `object` satisfies every equality constraint.
pub fn matches(object: &Value, query: &FindQuery) -> bool {
    query
        .constraints
        .iter()
        .all(|(field, expected)| object.get(field) == Some(expected))
}

/// Sorts objects by the query's sort keys, left to right.
pub fn sort(objects: &mut [Value], order: &[SortKey]) {
    if order.is_empty() {
        return;
    }
    objects.sort_by(|a, b| {
        for key in order {
            let ordering = compare_values(a.get(&key.field), b.get(&key.field));
            let ordering = if key.ascending {
                ordering
            } else {
                ordering.reverse()
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Orders JSON values: missing < null < bool < number < string, others equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Applies an update whose keys may use dot notation.
///
/// `{"config.enabledForClasses": [..]}` sets `enabledForClasses` inside the
/// `config` object, creating intermediate objects as needed and leaving
/// sibling keys untouched.
pub fn apply_update(target: &mut Map<String, Value>, update: Map<String, Value>) {
    for (path, value) in update {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            continue;
        };

        let mut current = &mut *target;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just replaced with an object"),
            };
        }
        current.insert(last.to_string(), value);
    }
}
