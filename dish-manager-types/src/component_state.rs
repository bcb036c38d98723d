//! The component-state map (spec §3): a typed mapping from a lower-cased
//! attribute name to its last-known value and quality.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Quality of a single attribute reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Valid,
    Invalid,
}

/// One attribute's last-known value, paired with its quality and the time
/// it was last written.
///
/// Value and quality are updated together (invariant 2 in spec §3): there is
/// no API that lets a caller change one without the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
    value: Value,
    quality: Quality,
    updated_at: DateTime<Utc>,
}

impl AttributeValue {
    /// The "unknown" sentinel every schema key starts as (invariant 1).
    pub fn unknown(now: DateTime<Utc>) -> Self {
        Self {
            value: Value::Null,
            quality: Quality::Invalid,
            updated_at: now,
        }
    }

    pub fn valid(value: impl Into<Value>, now: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            quality: Quality::Valid,
            updated_at: now,
        }
    }

    pub fn invalid(value: impl Into<Value>, now: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            quality: Quality::Invalid,
            updated_at: now,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_unknown(&self) -> bool {
        self.value.is_null()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        self.value
            .as_array()
            .map(|arr| arr.iter().filter_map(Value::as_f64).collect())
    }
}

/// A child or dish-level component-state mapping.
///
/// Created with a fixed schema (every key present, unknown, until the first
/// event populates it) and mutated one key at a time under the caller's own
/// locking (sub-component managers and the component manager each own one
/// behind a lock, per spec §3 "Ownership").
#[derive(Debug, Clone, Default)]
pub struct ComponentState {
    attributes: HashMap<String, AttributeValue>,
}

impl ComponentState {
    /// Build a component state with every schema key present as "unknown".
    pub fn new_with_schema(schema: &[&str], now: DateTime<Utc>) -> Self {
        let attributes = schema
            .iter()
            .map(|name| (name.to_lowercase(), AttributeValue::unknown(now)))
            .collect();
        Self { attributes }
    }

    /// Atomically set one key's value and quality.
    pub fn set(&mut self, name: &str, attr: AttributeValue) {
        self.attributes.insert(name.to_lowercase(), attr);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(&name.to_lowercase())
    }

    /// A read-copy snapshot for a consumer that must see a consistent view
    /// across several keys (spec §3 invariant 2, §5 "read-copy snapshot").
    pub fn snapshot(&self) -> HashMap<String, AttributeValue> {
        self.attributes.clone()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Degrade every key's quality to `Invalid` without losing the last
    /// known values (spec §3 invariant 3: a child whose communication state
    /// is `NOT_ESTABLISHED` keeps stale values readable but invalid).
    pub fn degrade_quality(&mut self, now: DateTime<Utc>) {
        for attr in self.attributes.values_mut() {
            attr.updated_at = now;
            attr.quality = Quality::Invalid;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::UNIX_EPOCH
    }

    #[test]
    fn new_schema_has_every_key_unknown() {
        let state = ComponentState::new_with_schema(&["operatingmode", "powerstate"], now());
        assert_eq!(state.len(), 2);
        assert!(state.get("operatingmode").unwrap().is_unknown());
        assert_eq!(
            state.get("operatingmode").unwrap().quality(),
            Quality::Invalid
        );
    }

    #[test]
    fn keys_are_lower_cased() {
        let state = ComponentState::new_with_schema(&["PowerState"], now());
        assert!(state.get("powerstate").is_some());
    }

    #[test]
    fn set_is_atomic_across_value_and_quality() {
        let mut state = ComponentState::new_with_schema(&["healthstate"], now());
        state.set("healthstate", AttributeValue::valid("OK", now()));
        let attr = state.get("healthstate").unwrap();
        assert_eq!(attr.as_str(), Some("OK"));
        assert_eq!(attr.quality(), Quality::Valid);
    }

    #[test]
    fn degrade_quality_keeps_values_but_marks_invalid() {
        let mut state = ComponentState::new_with_schema(&["powerstate"], now());
        state.set("powerstate", AttributeValue::valid("FULL_POWER", now()));
        state.degrade_quality(now());
        let attr = state.get("powerstate").unwrap();
        assert_eq!(attr.as_str(), Some("FULL_POWER"));
        assert_eq!(attr.quality(), Quality::Invalid);
    }

    #[test]
    fn snapshot_is_a_consistent_copy() {
        let mut state = ComponentState::new_with_schema(&["a", "b"], now());
        state.set("a", AttributeValue::valid(1.0, now()));
        let snap = state.snapshot();
        state.set("a", AttributeValue::valid(2.0, now()));
        assert_eq!(snap.get("a").unwrap().as_f64(), Some(1.0));
        assert_eq!(state.get("a").unwrap().as_f64(), Some(2.0));
    }
}
