//! Mutable per-agent view handed to strategy phases.

use sw_agent::{Agent, AgentStore};
use sw_core::{
    Action, ActionStatus, AgentId, Cargo, ObjectId, ObjectKind, Position, Tick, World, WorldObject, ZoneName,
};
use sw_mobility::{MoveOptions, MoveStatus, Mover};

/// What a phase decided about its job.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum JobOutcome {
    #[default]
    Active,
    /// The work is done; the job is dropped and its agents released.
    Complete,
    /// The target is gone or unusable; the job is dropped and its agents
    /// released.
    Invalid,
}

impl JobOutcome {
    #[inline]
    pub fn is_finished(self) -> bool {
        !matches!(self, JobOutcome::Active)
    }
}

/// Everything one agent may touch while running one phase.
///
/// Built by the runner for a single call and dropped afterwards.  Strategies
/// record their verdict on the job with [`complete`][Self::complete] or
/// [`invalidate`][Self::invalidate]; the runner acts on it once the phase
/// returns.
pub struct PhaseContext<'a> {
    pub tick:   Tick,
    pub agent:  AgentId,
    pub zone:   ZoneName,
    pub agents: &'a mut AgentStore,
    pub world:  &'a mut dyn World,
    pub mover:  &'a mut dyn Mover,
    outcome:    JobOutcome,
}

impl<'a> PhaseContext<'a> {
    pub fn new(
        tick:   Tick,
        agent:  AgentId,
        zone:   ZoneName,
        agents: &'a mut AgentStore,
        world:  &'a mut dyn World,
        mover:  &'a mut dyn Mover,
    ) -> Self {
        Self { tick, agent, zone, agents, world, mover, outcome: JobOutcome::Active }
    }

    // ── Job verdict ───────────────────────────────────────────────────────

    pub fn complete(&mut self) {
        self.outcome = JobOutcome::Complete;
    }

    pub fn invalidate(&mut self) {
        self.outcome = JobOutcome::Invalid;
    }

    pub fn outcome(&self) -> JobOutcome {
        self.outcome
    }

    // ── Agent state ───────────────────────────────────────────────────────

    pub fn me(&self) -> Option<&Agent> {
        self.agents.get(self.agent)
    }

    pub fn me_mut(&mut self) -> Option<&mut Agent> {
        self.agents.get_mut(self.agent)
    }

    pub fn position(&self) -> Option<Position> {
        self.world.position_of(self.agent)
    }

    pub fn cargo(&self) -> Cargo {
        self.world.cargo(self.agent)
    }

    /// Transient marker on this agent, cleared on every phase flip.
    pub fn marker(&self, key: &str) -> Option<ObjectId> {
        self.me().and_then(|a| a.custom.marker(key))
    }

    pub fn set_marker(&mut self, key: &str, id: ObjectId) {
        if let Some(agent) = self.me_mut() {
            agent.custom.set_marker(key, id);
        }
    }

    pub fn remove_marker(&mut self, key: &str) {
        if let Some(agent) = self.me_mut() {
            agent.custom.remove_marker(key);
        }
    }

    fn set_standing(&mut self, standing: bool) {
        if let Some(agent) = self.me_mut() {
            agent.standing = standing;
        }
    }

    // ── World ─────────────────────────────────────────────────────────────

    pub fn object(&self, id: ObjectId) -> Option<WorldObject> {
        self.world.object(id)
    }

    /// Nearest object of `kind` in this agent's zone passing `filter`.
    pub fn find_nearest(&self, kind: ObjectKind, filter: &dyn Fn(&WorldObject) -> bool) -> Option<WorldObject> {
        let from = self.position()?;
        self.world.find_nearest(&self.zone, from, kind, filter)
    }

    pub fn act(&mut self, action: Action) -> ActionStatus {
        self.world.act(self.agent, action)
    }

    pub fn move_to(&mut self, target: Position, opts: &MoveOptions) -> MoveStatus {
        self.mover.move_toward(self.agent, target, opts, self.agents, self.world)
    }

    /// `true` once the agent is within `range` of `target`; otherwise takes a
    /// step toward it and returns `false`.
    ///
    /// An agent in range is marked as standing, so crossing rules treat it
    /// as holding a work position.
    pub fn approach(&mut self, target: Position, range: u32) -> bool {
        let Some(pos) = self.position() else { return false };
        if pos.in_range_to(target, range) {
            self.set_standing(true);
            return true;
        }
        self.move_to(target, &MoveOptions::range(range));
        false
    }

    /// Walk to `target` and perform `action` on it once in range.
    ///
    /// Returns `None` while still walking.
    pub fn act_at(&mut self, target: Position, range: u32, action: Action) -> Option<ActionStatus> {
        if !self.approach(target, range) {
            return None;
        }
        Some(self.act(action))
    }
}
