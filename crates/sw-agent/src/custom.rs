//! Free-form per-agent data.
//!
//! Two maps: `entries` survive for the agent's lifetime, `markers` are
//! transient per-task notes (a chosen energy source, a sub-target) that the
//! behavior runner wipes whenever the agent flips between phases or loses its
//! job.  Values are stored as JSON so the whole record persists as-is.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    entries: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    markers: BTreeMap<String, Value>,
}

impl CustomData {
    // ── Persistent entries ────────────────────────────────────────────────

    /// Typed read; `None` if absent or of a different shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entries.get(key).and_then(|v| T::deserialize(v).ok())
    }

    /// Store a value.  Values that fail to serialize are ignored.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.entries.insert(key.into(), v);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // ── Transient markers ─────────────────────────────────────────────────

    pub fn marker<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.markers.get(key).and_then(|v| T::deserialize(v).ok())
    }

    pub fn set_marker<T: Serialize>(&mut self, key: impl Into<String>, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.markers.insert(key.into(), v);
        }
    }

    pub fn has_marker(&self, key: &str) -> bool {
        self.markers.contains_key(key)
    }

    pub fn remove_marker(&mut self, key: &str) -> Option<Value> {
        self.markers.remove(key)
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}
