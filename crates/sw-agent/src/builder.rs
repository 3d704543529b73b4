//! Fluent builder for a single agent.
//!
//! # Usage
//!
//! ```rust
//! use sw_agent::{AgentBuilder, AgentStore};
//! use sw_core::Role;
//!
//! let mut store = AgentStore::new();
//! let id = store.insert(
//!     AgentBuilder::new(Role::Builder, "W1N1")
//!         .capability("heavy_work")
//!         .spawned(),
//! );
//! assert!(store.get(id).unwrap().has_capability("heavy_work"));
//! ```

use serde::Serialize;

use sw_core::{AgentId, Role, ZoneName};

use crate::{Agent, CustomData, Lifecycle};

/// Describes an agent before it receives an ID from [`AgentStore::insert`].
///
/// [`AgentStore::insert`]: crate::AgentStore::insert
pub struct AgentBuilder {
    role:         Role,
    zone:         ZoneName,
    lifecycle:    Lifecycle,
    capabilities: Vec<String>,
    custom:       CustomData,
}

impl AgentBuilder {
    /// A spawning agent of `role` living in `zone`.
    pub fn new(role: Role, zone: impl Into<ZoneName>) -> Self {
        Self {
            role,
            zone: zone.into(),
            lifecycle: Lifecycle::Spawning,
            capabilities: Vec::new(),
            custom: CustomData::default(),
        }
    }

    /// Skip the spawning state: the agent already exists in the world.
    pub fn spawned(mut self) -> Self {
        self.lifecycle = Lifecycle::Unprepared;
        self
    }

    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.push(tag.into());
        self
    }

    pub fn custom<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Self {
        self.custom.set(key, value);
        self
    }

    pub(crate) fn build(self, id: AgentId) -> Agent {
        let mut agent = Agent::new(id, self.role, self.zone);
        agent.lifecycle = self.lifecycle;
        agent.capabilities.extend(self.capabilities);
        agent.custom = self.custom;
        agent
    }
}
