//! Persisted swarm state and where it lives.
//!
//! A [`Snapshot`] is written at the end of every tick through a
//! [`Repository`] and read back once when the swarm is built.  Jobs, agents
//! and delayed tasks are kept as raw JSON documents inside the snapshot so
//! that one undecodable entry (an unknown `type` tag or role, a missing
//! field) costs only that entry on restore.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use sw_agent::Agent;
use sw_core::{JobDomain, Position, Tick, ZoneName};
use sw_mobility::MovementRecord;

use crate::SimResult;

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The next tick to run.
    pub tick:    Tick,
    pub zones:   Vec<ZoneSnapshot>,
    /// [`AgentSnapshot`] documents, in insertion order.
    pub agents:  Vec<Value>,
    /// [`DelayedTask`](sw_schedule::DelayedTask) documents.
    #[serde(default)]
    pub delayed: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub name:   ZoneName,
    pub rally:  Position,
    /// Job documents per domain, in queue order.
    #[serde(default)]
    pub queues: BTreeMap<JobDomain, Vec<Value>>,
}

/// One agent with its movement record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent:    Agent,
    #[serde(default)]
    pub movement: Option<MovementRecord>,
}

// ── Repository ────────────────────────────────────────────────────────────────

/// Storage backend for snapshots.
pub trait Repository {
    /// The stored snapshot, or `None` when nothing was saved yet.
    fn load(&mut self) -> SimResult<Option<Snapshot>>;

    fn flush(&mut self, snapshot: &Snapshot) -> SimResult<()>;
}

/// Keeps the latest snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    snapshot: Option<Snapshot>,
    flushes:  usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot: Some(snapshot), flushes: 0 }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Number of `flush` calls so far.
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl Repository for MemoryRepository {
    fn load(&mut self) -> SimResult<Option<Snapshot>> {
        Ok(self.snapshot.clone())
    }

    fn flush(&mut self, snapshot: &Snapshot) -> SimResult<()> {
        self.snapshot = Some(snapshot.clone());
        self.flushes += 1;
        Ok(())
    }
}

/// One pretty-printed JSON file.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Repository for JsonFileRepository {
    fn load(&mut self) -> SimResult<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), "snapshot loaded");
        Ok(Some(snapshot))
    }

    fn flush(&mut self, snapshot: &Snapshot) -> SimResult<()> {
        let text = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
