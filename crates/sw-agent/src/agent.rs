//! The per-agent record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use sw_core::{AgentId, JobRef, Role, ZoneName};

use crate::CustomData;

/// Where an agent is in its preparation lifecycle.
///
/// Transitions are made only by the behavior runner:
///
/// ```text
/// Spawning ──(host reports a position)──▶ Unprepared ──(prepare() == true)──▶ Prepared
///                                              ▲                                 │
///                                              └──────(new assignment)───────────┘
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Not yet present in the world; the runner does nothing.
    #[default]
    Spawning,
    Unprepared,
    Prepared,
}

/// One swarm agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id:   AgentId,
    pub role: Role,
    pub zone: ZoneName,

    pub lifecycle: Lifecycle,

    /// `false` = source phase (gathering), `true` = target phase (performing).
    pub working: bool,

    /// Stationary while working in place; consulted by crossing rules.
    pub standing: bool,

    /// The job this agent is matched to.
    pub assigned: Option<JobRef>,

    /// The job the current `Prepared` state belongs to.
    pub prepared_for: Option<JobRef>,

    /// Tags matched against job requirements (e.g. `"heavy_work"`).
    pub capabilities: BTreeSet<String>,

    #[serde(default)]
    pub custom: CustomData,
}

impl Agent {
    pub fn new(id: AgentId, role: Role, zone: ZoneName) -> Self {
        Self {
            id,
            role,
            zone,
            lifecycle:    Lifecycle::Spawning,
            working:      false,
            standing:     false,
            assigned:     None,
            prepared_for: None,
            capabilities: BTreeSet::new(),
            custom:       CustomData::default(),
        }
    }

    /// `true` once the prepare phase of the current job has completed.
    #[inline]
    pub fn ready(&self) -> bool {
        self.lifecycle == Lifecycle::Prepared && self.prepared_for == self.assigned
    }

    #[inline]
    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.contains(tag)
    }

    /// `true` if the agent can be matched to a job right now.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.assigned.is_none() && self.lifecycle != Lifecycle::Spawning
    }

    /// Drop the job reference and everything tied to it.
    ///
    /// Called by the job queues whenever the referenced job disappears or the
    /// agent is moved to a different job.
    pub fn release_job(&mut self) {
        self.assigned = None;
        self.prepared_for = None;
        if self.lifecycle == Lifecycle::Prepared {
            self.lifecycle = Lifecycle::Unprepared;
        }
        self.working = false;
        self.standing = false;
        self.custom.clear_markers();
    }
}
