//! The `Swarm` struct and its tick loop.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use sw_agent::{AgentBuilder, AgentStore};
use sw_behavior::{AgentTurn, BehaviorRunner, Phase};
use sw_core::{AgentId, SwarmConfig, Tick, World, ZoneName};
use sw_mobility::{MovementEngine, Mover};
use sw_path::Router;
use sw_schedule::{DelayedTask, DelayedTaskRegistry, DrainReport};
use sw_task::{Assignment, Dispatcher};

use crate::repository::{AgentSnapshot, Repository, Snapshot, ZoneSnapshot};
use crate::{SimError, SimResult, SwarmObserver, TickReport, Zone};

// ── Swarm ─────────────────────────────────────────────────────────────────────

/// The agent swarm and everything it needs to run a tick.
///
/// One [`step`](Self::step) is a single cooperative pass:
///
/// 1. **Delayed tasks**: every task due at or before the current tick fires,
///    in `(fire_at, insertion)` order.  Callbacks get their zone and the agent
///    store, so they may add, update or remove jobs.
/// 2. **Reconcile**: for each zone in name order, the [`Dispatcher`] matches
///    idle agents to open job slots.
/// 3. **Agent pass**: each agent, in insertion order, runs one turn of its
///    job's strategy through the [`BehaviorRunner`].
/// 4. **Housekeeping**: the shared path cache is pruned, the host clock
///    advances and the snapshot is flushed to the repository, if any.
///
/// Removing a job or an agent takes effect immediately for everything later
/// in the same tick.
///
/// Create via [`SwarmBuilder`][crate::SwarmBuilder].
pub struct Swarm<R: Router, W: World> {
    pub config:   SwarmConfig,

    /// The next tick to run.
    pub tick:     Tick,

    /// Zones keyed by name; iteration order is reconcile order.
    pub zones:    BTreeMap<ZoneName, Zone>,

    /// Insertion-ordered agent arena.
    pub agents:   AgentStore,

    /// Movement engine: router, per-agent records, path cache, crossing rules.
    pub movement: MovementEngine<R>,

    /// Strategy registry and per-agent state machine.
    pub runner:   BehaviorRunner,

    /// Tick-keyed callbacks.  Sealed by the builder.
    pub delayed:  DelayedTaskRegistry<Zone, AgentStore>,

    /// The host.
    pub world:    W,

    pub(crate) repository: Option<Box<dyn Repository>>,
}

impl<R: Router, W: World> Swarm<R, W> {
    // ── Loop ──────────────────────────────────────────────────────────────

    /// Run from the current tick up to `config.total_ticks`.
    pub fn run<O: SwarmObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.tick.0 < self.config.total_ticks {
            self.step(observer)?;
        }
        observer.on_run_end(self.tick);
        Ok(())
    }

    /// Run exactly `n` ticks, ignoring `total_ticks`.
    pub fn run_ticks<O: SwarmObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Run one tick.
    ///
    /// Agent-level failures are logged and counted in the report; the pass
    /// always reaches every agent.
    pub fn step<O: SwarmObserver>(&mut self, observer: &mut O) -> SimResult<TickReport> {
        let now = self.tick;
        observer.on_tick_start(now);
        let mut report = TickReport::new(now);

        // ── Phase 1: delayed tasks ────────────────────────────────────────
        report.delayed = self.drain_delayed_tasks(now)?;

        // ── Phase 2: reconcile, zone name order ───────────────────────────
        let names: Vec<ZoneName> = self.zones.keys().cloned().collect();
        for name in &names {
            for assignment in self.reconcile_zone(name)? {
                observer.on_assignment(now, &assignment);
                report.assignments += 1;
            }
        }

        // ── Phase 3: agent pass, insertion order ──────────────────────────
        for id in self.agents.ids() {
            // Removed earlier in this pass.
            if !self.agents.contains(id) {
                continue;
            }
            match self.run_agent(id) {
                Ok(turn) => {
                    report.turns += 1;
                    if matches!(turn.phase, Phase::Standby(_)) {
                        report.standby += 1;
                    }
                    if turn.flipped {
                        report.flips += 1;
                    }
                    if let Some(finished) = &turn.finished {
                        report.finished += 1;
                        observer.on_job_finished(now, id, finished);
                    }
                    observer.on_agent_turn(now, &turn);
                }
                Err(e) => {
                    warn!(agent = %id, tick = %now, error = %e, "agent turn failed");
                    report.errors += 1;
                }
            }
        }

        // ── Phase 4: housekeeping ─────────────────────────────────────────
        report.pruned_paths = self.movement.prune_cache(now);
        report.pending_jobs = self.zones.values().map(|z| z.board.job_count()).sum();
        self.world.advance();
        self.tick = now.next();

        if self.repository.is_some() {
            let snapshot = self.snapshot();
            if let Some(repo) = self.repository.as_mut() {
                repo.flush(&snapshot)?;
            }
        }

        debug!(
            tick = %now,
            assignments = report.assignments,
            turns = report.turns,
            finished = report.finished,
            pending = report.pending_jobs,
            "tick done",
        );
        observer.on_tick_end(&report);
        Ok(report)
    }

    // ── Tick phases ───────────────────────────────────────────────────────

    /// Fire every delayed task due at or before `now`.
    pub fn drain_delayed_tasks(&mut self, now: Tick) -> SimResult<DrainReport> {
        Ok(self.delayed.drain_due(now, &mut self.zones, &mut self.agents)?)
    }

    /// Match idle agents of `zone` to its open jobs.
    pub fn reconcile_zone(&mut self, zone: &ZoneName) -> SimResult<Vec<Assignment>> {
        let z = self
            .zones
            .get_mut(zone)
            .ok_or_else(|| SimError::UnknownZone(zone.clone()))?;
        Ok(Dispatcher::reconcile(&mut z.board, &mut self.agents))
    }

    /// Run one turn for agent `id` against its zone's board.
    pub fn run_agent(&mut self, id: AgentId) -> SimResult<AgentTurn> {
        let zone_name = self.agents.get(id).ok_or(SimError::AgentNotFound(id))?.zone.clone();
        let zone = self
            .zones
            .get_mut(&zone_name)
            .ok_or(SimError::UnknownZone(zone_name))?;
        let turn = self.runner.run_agent(
            self.tick,
            id,
            &mut zone.board,
            zone.rally,
            &mut self.agents,
            &mut self.world,
            &mut self.movement,
        )?;
        Ok(turn)
    }

    // ── Zones ─────────────────────────────────────────────────────────────

    pub fn add_zone(&mut self, zone: Zone) -> SimResult<()> {
        if self.zones.contains_key(&zone.name) {
            return Err(SimError::DuplicateZone(zone.name));
        }
        self.zones.insert(zone.name.clone(), zone);
        Ok(())
    }

    pub fn zone(&self, name: &ZoneName) -> Option<&Zone> {
        self.zones.get(name)
    }

    pub fn zone_mut(&mut self, name: &ZoneName) -> Option<&mut Zone> {
        self.zones.get_mut(name)
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Add an agent.  Its zone must already exist.
    pub fn spawn(&mut self, builder: AgentBuilder) -> SimResult<AgentId> {
        let id = self.agents.insert(builder);
        let zone = self.agents.get(id).map(|a| a.zone.clone());
        if let Some(zone) = zone.filter(|z| !self.zones.contains_key(z)) {
            self.agents.remove(id);
            return Err(SimError::UnknownZone(zone));
        }
        Ok(id)
    }

    /// Remove an agent, releasing its job slot and movement state.
    pub fn remove_agent(&mut self, id: AgentId) -> SimResult<()> {
        let mut agent = self.agents.remove(id).ok_or(SimError::AgentNotFound(id))?;
        if let Some(zone) = self.zones.get_mut(&agent.zone) {
            zone.board.release(&mut agent);
        }
        self.movement.forget(id);
        info!(agent = %id, role = %agent.role, "agent removed");
        Ok(())
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Capture boards, agents, movement records and pending delayed tasks.
    pub fn snapshot(&self) -> Snapshot {
        let agents = self
            .agents
            .iter()
            .map(|a| AgentSnapshot { agent: a.clone(), movement: self.movement.store.get(a.id).cloned() })
            .filter_map(|entry| encode("agent", entry.agent.id, &entry))
            .collect();
        let delayed = self
            .delayed
            .pending()
            .filter_map(|task| encode("delayed task", &task.name, task))
            .collect();
        Snapshot {
            tick:    self.tick,
            zones:   self
                .zones
                .values()
                .map(|z| ZoneSnapshot { name: z.name.clone(), rally: z.rally, queues: z.board.to_snapshot() })
                .collect(),
            agents,
            delayed,
        }
    }

    /// Replace all zone, agent and delayed-task state with `snapshot`.
    ///
    /// Undecodable jobs, agents and delayed tasks, and delayed tasks without
    /// a registered callback, are logged and skipped; returns how many entries were dropped.  Counters
    /// and assignments are then recomputed from the agents, so references
    /// to skipped jobs are released.
    pub fn restore(&mut self, snapshot: Snapshot) -> SimResult<usize> {
        let mut skipped = 0;

        self.zones.clear();
        for zs in snapshot.zones {
            let (board, s) = sw_task::TaskBoard::from_snapshot(zs.name.clone(), zs.queues);
            if s > 0 {
                warn!(zone = %zs.name, skipped = s, "malformed jobs skipped on restore");
            }
            skipped += s;
            self.zones.insert(zs.name.clone(), Zone { name: zs.name, board, rally: zs.rally });
        }

        self.agents.clear();
        self.movement.store.clear();
        let mut agents = Vec::with_capacity(snapshot.agents.len());
        for entry in snapshot.agents {
            let Some(AgentSnapshot { agent, movement }) = decode::<AgentSnapshot>("agent", entry) else {
                skipped += 1;
                continue;
            };
            if let Some(record) = movement {
                self.movement.store.insert(agent.id, record);
            }
            agents.push(agent);
        }
        self.agents.restore(agents);

        self.delayed.clear();
        for entry in snapshot.delayed {
            let Some(task) = decode::<DelayedTask>("delayed task", entry) else {
                skipped += 1;
                continue;
            };
            let name = task.name.clone();
            if let Err(e) = self.delayed.restore([task]) {
                warn!(task = %name, error = %e, "delayed task skipped on restore");
                skipped += 1;
            }
        }

        for zone in self.zones.values_mut() {
            zone.board.sync(&mut self.agents);
        }
        // Agents of zones that no longer exist.
        for agent in self.agents.iter_mut() {
            if agent.assigned.is_some() && !self.zones.contains_key(&agent.zone) {
                agent.release_job();
            }
        }

        self.tick = snapshot.tick;
        info!(tick = %self.tick, zones = self.zones.len(), agents = self.agents.len(), skipped, "swarm restored");
        Ok(skipped)
    }

    /// Flush the current state now, outside the tick loop.
    pub fn flush(&mut self) -> SimResult<()> {
        let snapshot = self.snapshot();
        match self.repository.as_mut() {
            Some(repo) => repo.flush(&snapshot),
            None => Ok(()),
        }
    }

    pub fn has_repository(&self) -> bool {
        self.repository.is_some()
    }
}

/// Persisted form of one snapshot entry; `None` (logged) if it cannot be
/// encoded.
fn encode<T: Serialize>(what: &str, id: impl fmt::Display, entry: &T) -> Option<Value> {
    match serde_json::to_value(entry) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(what, id = %id, error = %e, "entry not persisted");
            None
        }
    }
}

/// Decode one snapshot entry; `None` (logged) if it is malformed.
fn decode<T: DeserializeOwned>(what: &str, entry: Value) -> Option<T> {
    match serde_json::from_value(entry) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(what, error = %e, "malformed entry skipped on restore");
            None
        }
    }
}
