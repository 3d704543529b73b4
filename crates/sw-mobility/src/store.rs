//! The `MobilityStore` — movement records of every agent that has moved.

use std::collections::BTreeMap;

use sw_core::AgentId;

use crate::MovementRecord;

/// Sparse `AgentId → MovementRecord` map.  Agents get a record the first
/// time they ask to move.
#[derive(Default)]
pub struct MobilityStore {
    records: BTreeMap<AgentId, MovementRecord>,
}

impl MobilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, agent: AgentId) -> Option<&MovementRecord> {
        self.records.get(&agent)
    }

    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut MovementRecord> {
        self.records.get_mut(&agent)
    }

    /// The record of `agent`, created empty if missing.
    pub fn entry(&mut self, agent: AgentId) -> &mut MovementRecord {
        self.records.entry(agent).or_default()
    }

    pub fn insert(&mut self, agent: AgentId, record: MovementRecord) {
        self.records.insert(agent, record);
    }

    pub fn remove(&mut self, agent: AgentId) -> Option<MovementRecord> {
        self.records.remove(&agent)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &MovementRecord)> + '_ {
        self.records.iter().map(|(&id, r)| (id, r))
    }
}
