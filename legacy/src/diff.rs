//! Leaf-level diff of two JSON trees.

use crate::path::join;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// One changed leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafChange {
    /// Dotted path of the leaf
    pub path: String,
    /// Value before the change, `null` if absent
    pub old_value: Value,
    /// Value after the change, `null` if absent
    pub new_value: Value,
}

/// A changed leaf together with the state it was observed in
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Dotted path of the leaf
    pub path: String,
    /// Value before the change
    pub old_value: Value,
    /// Value after the change
    pub new_value: Value,
    /// Whole state after the change
    pub state: Arc<Value>,
}

impl ChangeEvent {
    /// Attach the resulting state to a leaf change
    #[must_use]
    pub fn new(change: LeafChange, state: Arc<Value>) -> Self {
        Self {
            path: change.path,
            old_value: change.old_value,
            new_value: change.new_value,
            state,
        }
    }

    /// Bus payload `{ path, oldValue, newValue, state }`
    #[must_use]
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "path": self.path,
            "oldValue": self.old_value,
            "newValue": self.new_value,
            "state": *self.state,
        })
    }
}

/// Every leaf that differs between `old` and `new`, below `prefix`
///
/// Objects are compared key by key over the union of their keys and arrays
/// index by index; a side that lacks the key or index counts as `null`. An
/// object facing anything else is compared against an empty object, so every
/// field it gains or loses is reported as its own leaf.
#[must_use]
pub fn diff(prefix: &str, old: &Value, new: &Value) -> Vec<LeafChange> {
    let mut changes = Vec::new();
    diff_into(prefix, old, new, &mut changes);
    changes
}

fn diff_into(path: &str, old: &Value, new: &Value, changes: &mut Vec<LeafChange>) {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => diff_objects(path, old, new, changes),
        (Value::Object(old), other) => {
            diff_objects(path, old, &Map::new(), changes);
            diff_into(path, &Value::Null, other, changes);
        },
        (other, Value::Object(new)) => {
            diff_into(path, other, &Value::Null, changes);
            diff_objects(path, &Map::new(), new, changes);
        },
        (Value::Array(old), Value::Array(new)) => {
            for i in 0..old.len().max(new.len()) {
                diff_into(
                    &join(path, &i.to_string()),
                    old.get(i).unwrap_or(&Value::Null),
                    new.get(i).unwrap_or(&Value::Null),
                    changes,
                );
            }
        },
        _ if old != new => changes.push(LeafChange {
            path: path.to_string(),
            old_value: old.clone(),
            new_value: new.clone(),
        }),
        _ => {},
    }
}

/// Every leaf of `value` as `(path, value)`; arrays count as leaves
#[must_use]
pub fn leaves(value: &Value) -> Vec<(String, Value)> {
    fn walk(path: &str, value: &Value, out: &mut Vec<(String, Value)>) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    walk(&join(path, key), child, out);
                }
            },
            _ => out.push((path.to_string(), value.clone())),
        }
    }

    let mut out = Vec::new();
    walk("", value, &mut out);
    out
}

fn diff_objects(
    path: &str,
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    changes: &mut Vec<LeafChange>,
) {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    for key in keys {
        diff_into(
            &join(path, key),
            old.get(key).unwrap_or(&Value::Null),
            new.get(key).unwrap_or(&Value::Null),
            changes,
        );
    }
}
