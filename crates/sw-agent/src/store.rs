//! `AgentStore` — the insertion-ordered agent arena.
//!
//! # Ordering
//!
//! IDs are allocated monotonically and the store is a `BTreeMap` keyed by
//! `AgentId`, so ascending-key iteration *is* insertion order.  The tick loop
//! relies on this for reproducible runs: agents act in the order they were
//! added, no matter how many were removed in between.

use std::collections::BTreeMap;

use sw_core::{AgentId, JobRef, ZoneName};

use crate::{Agent, AgentBuilder};

#[derive(Debug)]
pub struct AgentStore {
    agents:  BTreeMap<AgentId, Agent>,
    next_id: AgentId,
}

impl Default for AgentStore {
    fn default() -> Self {
        Self { agents: BTreeMap::new(), next_id: AgentId(0) }
    }
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new agent described by `builder` and return its ID.
    pub fn insert(&mut self, builder: AgentBuilder) -> AgentId {
        let id = self.next_id;
        self.next_id = id.next();
        self.agents.insert(id, builder.build(id));
        id
    }

    /// Re-insert agents restored from a snapshot, keeping their IDs.
    ///
    /// The allocator is moved past the largest restored ID so later inserts
    /// still sort after every existing agent.
    pub fn restore(&mut self, agents: impl IntoIterator<Item = Agent>) {
        for agent in agents {
            if agent.id >= self.next_id {
                self.next_id = agent.id.next();
            }
            self.agents.insert(agent.id, agent);
        }
    }

    /// Remove an agent.  The caller must release its job slot.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        self.agents.remove(&id)
    }

    pub fn clear(&mut self) {
        self.agents.clear();
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Snapshot of all IDs in insertion order.
    ///
    /// Returned as a `Vec` so callers can mutate the store while walking it.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// All agents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.agents.values_mut()
    }

    /// Agents living in `zone`, in insertion order.
    pub fn in_zone<'a>(&'a self, zone: &'a ZoneName) -> impl Iterator<Item = &'a Agent> + 'a {
        self.agents.values().filter(move |a| &a.zone == zone)
    }

    /// Agents in `zone` whose assignment is `job`.
    pub fn assigned_to<'a>(
        &'a self,
        zone: &'a ZoneName,
        job:  JobRef,
    ) -> impl Iterator<Item = &'a Agent> + 'a {
        self.in_zone(zone).filter(move |a| a.assigned == Some(job))
    }
}
