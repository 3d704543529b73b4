//! `BehaviorRunner` — drives one agent through one tick.
//!
//! # Per-agent turn
//!
//! ```text
//! Spawning ─ position known? ─▶ Unprepared           (no action this tick)
//! no job / job gone / no strategy ─▶ standby         (walk to the rally spread)
//! assignment changed ─▶ Unprepared
//! Unprepared ─ prepare() ─▶ Prepared                 (no phase this tick)
//! Prepared ─ working ? target() : source()
//!            └─ true ─▶ flip `working`, clear markers
//! outcome Complete / Invalid ─▶ remove job, release its agents
//! ```
//!
//! The runner is the only code that changes `lifecycle` and `working`.

use tracing::{debug, info, warn};

use sw_agent::{AgentStore, Lifecycle};
use sw_core::{AgentId, AgentRng, JobRef, Position, Tick, World};
use sw_mobility::{MoveOptions, MoveStatus, Mover};
use sw_task::{JobTag, TaskBoard};

use crate::{BehaviorError, BehaviorResult, JobOutcome, PhaseContext, StrategyRegistry};

/// What an agent did this turn.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Still spawning; `true` once the host reported a position and the
    /// agent became `Unprepared`.
    Spawning(bool),
    /// No usable job; walked toward its standby cell.
    Standby(MoveStatus),
    /// Ran `prepare`; `true` when it finished.
    Prepare(bool),
    Source,
    Target,
}

/// A job the runner dropped after its strategy reported an outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedJob {
    pub job:     JobRef,
    pub tag:     JobTag,
    pub outcome: JobOutcome,
}

/// Result of [`BehaviorRunner::run_agent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentTurn {
    pub agent:    AgentId,
    pub phase:    Phase,
    /// `working` flipped this turn.
    pub flipped:  bool,
    pub finished: Option<FinishedJob>,
}

impl AgentTurn {
    fn new(agent: AgentId, phase: Phase) -> Self {
        Self { agent, phase, flipped: false, finished: None }
    }
}

pub struct BehaviorRunner {
    strategies:     StrategyRegistry,
    seed:           u64,
    standby_spread: u32,
}

impl BehaviorRunner {
    pub fn new(strategies: StrategyRegistry, seed: u64, standby_spread: u32) -> Self {
        Self { strategies, seed, standby_spread }
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    pub fn strategies_mut(&mut self) -> &mut StrategyRegistry {
        &mut self.strategies
    }

    /// The cell `agent` idles on: a fixed, seeded scatter around `rally`.
    pub fn standby_cell(&self, agent: AgentId, rally: Position) -> Position {
        AgentRng::new(self.seed, agent).scatter(rally, self.standby_spread)
    }

    /// Run one turn for `id`.
    ///
    /// `board` must be the board of the agent's zone and `rally` its rally
    /// point.  Fails only when `id` is not in `agents`.
    #[allow(clippy::too_many_arguments)]
    pub fn run_agent(
        &self,
        tick:   Tick,
        id:     AgentId,
        board:  &mut TaskBoard,
        rally:  Position,
        agents: &mut AgentStore,
        world:  &mut dyn World,
        mover:  &mut dyn Mover,
    ) -> BehaviorResult<AgentTurn> {
        let agent = agents.get_mut(id).ok_or(BehaviorError::AgentNotFound(id))?;

        // ── Spawning ──────────────────────────────────────────────────────
        if agent.lifecycle == Lifecycle::Spawning {
            let placed = world.position_of(id).is_some();
            if placed {
                agent.lifecycle = Lifecycle::Unprepared;
                debug!(agent = %id, "spawned");
            }
            return Ok(AgentTurn::new(id, Phase::Spawning(placed)));
        }

        // A new assignment invalidates readiness.
        if agent.assigned != agent.prepared_for {
            agent.lifecycle = Lifecycle::Unprepared;
            agent.prepared_for = None;
        }

        // ── Job lookup ────────────────────────────────────────────────────
        let Some(job_ref) = agent.assigned else {
            return Ok(self.standby(tick, id, rally, agents, world, mover));
        };
        let Some(job) = board.get(job_ref).cloned() else {
            debug!(agent = %id, job = %job_ref, "assigned job is gone");
            board.release(agent);
            return Ok(self.standby(tick, id, rally, agents, world, mover));
        };
        let Some(strategy) = self.strategies.get(job.tag()) else {
            warn!(agent = %id, job = %job_ref, kind = %job.tag(), "no strategy registered");
            return Ok(self.standby(tick, id, rally, agents, world, mover));
        };
        let zone = agent.zone.clone();
        let ready = agent.ready();
        let has_source = strategy.has_source();
        if !has_source {
            agent.working = true;
        }
        let working = agent.working;

        let mut ctx = PhaseContext::new(tick, id, zone, agents, world, mover);

        // ── Phases ────────────────────────────────────────────────────────
        let mut turn;
        if !ready {
            let done = strategy.prepare(&mut ctx, &job);
            turn = AgentTurn::new(id, Phase::Prepare(done));
            if done && !ctx.outcome().is_finished() {
                if let Some(agent) = ctx.me_mut() {
                    agent.lifecycle = Lifecycle::Prepared;
                    agent.prepared_for = Some(job_ref);
                }
                debug!(agent = %id, job = %job_ref, "prepared");
            }
        } else {
            let done = if working { strategy.target(&mut ctx, &job) } else { strategy.source(&mut ctx, &job) };
            turn = AgentTurn::new(id, if working { Phase::Target } else { Phase::Source });
            if done {
                if let Some(agent) = ctx.me_mut() {
                    // Source-less jobs stay in the target phase.
                    if has_source {
                        agent.working = !agent.working;
                        turn.flipped = true;
                    }
                    agent.custom.clear_markers();
                }
            }
        }

        // ── Outcome ───────────────────────────────────────────────────────
        let outcome = ctx.outcome();
        drop(ctx);
        if outcome.is_finished() {
            info!(agent = %id, job = %job_ref, kind = %job.tag(), ?outcome, "job finished");
            board.remove(job_ref, agents)?;
            turn.finished = Some(FinishedJob { job: job_ref, tag: job.tag(), outcome });
        }
        Ok(turn)
    }

    fn standby(
        &self,
        tick:   Tick,
        id:     AgentId,
        rally:  Position,
        agents: &mut AgentStore,
        world:  &mut dyn World,
        mover:  &mut dyn Mover,
    ) -> AgentTurn {
        let cell = self.standby_cell(id, rally);
        let status = mover.move_toward(id, cell, &MoveOptions::default(), agents, world);
        if !status.in_progress() && status != MoveStatus::Arrived {
            debug!(agent = %id, %tick, ?status, "standby move failed");
        }
        AgentTurn::new(id, Phase::Standby(status))
    }
}
