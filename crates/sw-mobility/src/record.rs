//! Per-agent movement state.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use sw_core::{Direction, Position};

/// How the next path search should be run.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repath {
    /// Shared cache first, then a terrain-only search.
    #[default]
    Normal,
    /// Skip the cache lookup; the result overwrites the cached entry.
    Fresh,
    /// Treat other agents as impassable.  Cached apart from terrain-only
    /// paths, under [`AVOID_AGENTS`](crate::engine::AVOID_AGENTS).
    AvoidAgents,
}

/// The movement state of one agent.
///
/// `path` holds the steps still to take from `last_position` (or from the
/// current cell when no step is pending).  A step is only removed from the
/// front once the agent is seen standing on its destination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    /// Remaining steps as direction digits.
    pub path: String,

    /// Cell the agent stood on when it issued its last step.
    pub last_position: Option<Position>,

    /// Direction of that step.
    pub last_direction: Option<Direction>,

    /// Hash of `(target, range, waypoints)` the path was computed for.
    pub target_hash: u64,

    pub waypoints: Vec<Position>,

    /// Index of the next waypoint to reach.
    pub waypoint_cursor: usize,

    /// Steps taken on the current path.
    pub uses: u32,

    /// Consecutive ticks spent waiting on a yielding occupant.
    pub stuck_ticks: u32,

    #[serde(default)]
    pub repath: Repath,
}

impl MovementRecord {
    /// Hash identifying one movement goal.
    pub fn hash_target(target: Position, range: u32, waypoints: &[Position]) -> u64 {
        let mut h = FxHasher::default();
        target.hash(&mut h);
        range.hash(&mut h);
        waypoints.hash(&mut h);
        h.finish()
    }

    /// Start over for a new goal.
    pub fn reset(&mut self, target_hash: u64, waypoints: Vec<Position>) {
        *self = MovementRecord { target_hash, waypoints, ..MovementRecord::default() };
    }

    /// Forget the current path but keep goal and waypoint progress.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.uses = 0;
        self.last_position = None;
        self.last_direction = None;
    }

    /// The first pending step.
    #[inline]
    pub fn next_step(&self) -> Option<Direction> {
        self.path.chars().next().and_then(Direction::from_digit)
    }

    /// Drop the first pending step after it has been confirmed.
    pub fn pop_step(&mut self) {
        if !self.path.is_empty() {
            self.path.remove(0);
        }
    }

    /// The waypoint still to be reached, if any.
    #[inline]
    pub fn current_waypoint(&self) -> Option<Position> {
        self.waypoints.get(self.waypoint_cursor).copied()
    }
}
