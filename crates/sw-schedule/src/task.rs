//! The delayed task record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sw_core::{Tick, ZoneName};

/// What a delayed task carries to its callback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayPayload {
    /// Zone the callback should act on.
    pub zone: ZoneName,

    /// Free-form arguments.
    #[serde(default)]
    pub data: Value,
}

impl DelayPayload {
    pub fn new(zone: impl Into<ZoneName>) -> Self {
        Self { zone: zone.into(), data: Value::Null }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// A one-shot callback invocation scheduled for `fire_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayedTask {
    pub name:    String,
    pub payload: DelayPayload,
    pub fire_at: Tick,
}

impl DelayedTask {
    pub fn new(name: impl Into<String>, payload: DelayPayload, fire_at: Tick) -> Self {
        Self { name: name.into(), payload, fire_at }
    }

    #[inline]
    pub fn is_due(&self, now: Tick) -> bool {
        self.fire_at <= now
    }
}
