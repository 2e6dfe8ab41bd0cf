//! Spelling-aware field lookup over loosely-typed JSON records.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Read-only view of a raw record. Non-objects behave as records with no fields.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RawRecord<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> RawRecord<'a> {
    pub(crate) fn new(value: &'a Value) -> Self {
        Self {
            fields: value.as_object(),
        }
    }

    /// First value among `keys` (tried in order) that is non-null and accepted.
    fn lookup(&self, keys: &[&str], accept: impl Fn(&Value) -> bool) -> Option<&'a Value> {
        let fields = self.fields?;
        keys.iter()
            .filter_map(|key| fields.get(*key))
            .find(|value| !value.is_null() && accept(value))
    }

    pub(crate) fn string(&self, keys: &[&str]) -> Option<String> {
        self.lookup(keys, Value::is_string)
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    pub(crate) fn boolean(&self, keys: &[&str]) -> Option<bool> {
        self.lookup(keys, Value::is_boolean).and_then(Value::as_bool)
    }

    pub(crate) fn step(&self, keys: &[&str]) -> Option<u32> {
        self.lookup(keys, |v| v.as_u64().is_some_and(|n| u32::try_from(n).is_ok()))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }

    /// Any non-null JSON value, unchanged.
    pub(crate) fn any(&self, keys: &[&str]) -> Option<Value> {
        self.lookup(keys, |_| true).cloned()
    }

    /// String elements of the first array-valued spelling; other elements are dropped.
    pub(crate) fn strings(&self, keys: &[&str]) -> Option<Vec<String>> {
        self.lookup(keys, Value::is_array)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
    }

    pub(crate) fn object(&self, keys: &[&str]) -> Option<&'a Map<String, Value>> {
        self.lookup(keys, Value::is_object).and_then(Value::as_object)
    }

    /// First spelling whose value deserializes into `T`.
    pub(crate) fn typed<T: DeserializeOwned>(&self, keys: &[&str]) -> Option<T> {
        let fields = self.fields?;
        keys.iter()
            .filter_map(|key| fields.get(*key))
            .filter(|value| !value.is_null())
            .find_map(|value| serde_json::from_value(value.clone()).ok())
    }

    /// True when any of `keys` is present, whatever its value (null included).
    pub(crate) fn has_any(&self, keys: &[&str]) -> bool {
        self.fields
            .is_some_and(|fields| keys.iter().any(|key| fields.contains_key(*key)))
    }
}

/// Decode `value` into `slot`. Returns false, leaving `slot` alone, when the
/// shape does not fit.
pub(crate) fn decode_into<T: DeserializeOwned>(slot: &mut Option<T>, value: &Value) -> bool {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => {
            *slot = Some(decoded);
            true
        }
        Err(_) => false,
    }
}

/// Records held by a collection file.
///
/// Accepts a bare array or a container object holding the array under
/// `key`. Anything else (including a container without `key`) is empty.
pub fn collection_items<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    match data {
        Value::Array(items) => items,
        Value::Object(container) => container
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}
