//! Fluent builder for constructing a [`Swarm`].
//!
//! The builder is the initialization phase: strategies, crossing rules and
//! delayed-task callbacks can only be registered here.  [`SwarmBuilder::build`]
//! seals the callback table, so a late registration is an error rather than a
//! silently lost callback.

use std::collections::BTreeMap;

use tracing::info;

use sw_agent::{Agent, AgentBuilder, AgentStore};
use sw_behavior::{BehaviorRunner, JobStrategy, StrategyRegistry};
use sw_core::{Position, Role, SwarmConfig, Tick, World, ZoneName};
use sw_mobility::{CrossingDecision, CrossingPolicy, MovementEngine};
use sw_path::Router;
use sw_schedule::{CallbackError, DelayPayload, DelayedTask, DelayedTaskRegistry, Rearm, Resolved};
use sw_task::JobTag;

use crate::{Repository, SimError, SimResult, Swarm, Zone};

/// Fluent builder for [`Swarm<R, W>`].
///
/// # Required inputs
///
/// - [`SwarmConfig`]: seed, total ticks, standby spread, movement tuning
/// - `R: Router`: the path search (e.g. [`sw_path::AStarRouter`])
/// - `W: World`: the host (e.g. [`GridWorld`][crate::GridWorld])
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                  |
/// |------------------------|------------------------------------------|
/// | `.zone(name, rally)`   | no zones                                 |
/// | `.agent(b)`            | no agents                                |
/// | `.strategy(tag, s)`    | the built-in strategy for every tag      |
/// | `.crossing_rule(r, f)` | [`CrossingPolicy::standard`]             |
/// | `.callback(name, f)`   | no callbacks                             |
/// | `.delayed(name, p, t)` | no delayed tasks                         |
/// | `.repository(r)`       | no persistence                           |
///
/// When the repository already holds a snapshot, the snapshot wins over the
/// declared agents and delayed tasks; declared zones missing from it are
/// added with empty boards.
///
/// # Example
///
/// ```rust,ignore
/// let mut swarm = SwarmBuilder::new(config, AStarRouter::default(), world)
///     .zone("W1N1", Position::new(25, 25))
///     .agent(AgentBuilder::new(Role::Worker, "W1N1"))
///     .build()?;
/// swarm.run(&mut NoopObserver)?;
/// ```
pub struct SwarmBuilder<R: Router, W: World> {
    config:     SwarmConfig,
    router:     R,
    world:      W,
    zones:      Vec<(ZoneName, Position)>,
    agents:     Vec<AgentBuilder>,
    strategies: StrategyRegistry,
    crossing:   CrossingPolicy,
    delayed:    DelayedTaskRegistry<Zone, AgentStore>,
    seeds:      Vec<DelayedTask>,
    repository: Option<Box<dyn Repository>>,
    /// First registration failure, reported by `build`.
    error:      Option<SimError>,
}

impl<R: Router, W: World> SwarmBuilder<R, W> {
    /// Create a builder with all required inputs.
    pub fn new(config: SwarmConfig, router: R, world: W) -> Self {
        Self {
            config,
            router,
            world,
            zones:      Vec::new(),
            agents:     Vec::new(),
            strategies: StrategyRegistry::with_builtins(),
            crossing:   CrossingPolicy::standard(),
            delayed:    DelayedTaskRegistry::new(),
            seeds:      Vec::new(),
            repository: None,
            error:      None,
        }
    }

    /// Declare a zone and the rally point its idle agents gather around.
    pub fn zone(mut self, name: impl Into<ZoneName>, rally: Position) -> Self {
        self.zones.push((name.into(), rally));
        self
    }

    pub fn agent(mut self, agent: AgentBuilder) -> Self {
        self.agents.push(agent);
        self
    }

    /// Install `strategy` for `tag`, replacing the built-in one.
    pub fn strategy(mut self, tag: JobTag, strategy: impl JobStrategy + 'static) -> Self {
        self.strategies.replace(tag, strategy);
        self
    }

    /// Override the crossing rule applied when an occupant of `role` blocks
    /// another agent.
    pub fn crossing_rule<F>(mut self, role: Role, rule: F) -> Self
    where
        F: Fn(&Agent, &Agent) -> CrossingDecision + Send + Sync + 'static,
    {
        self.crossing.set_rule(role, rule);
        self
    }

    /// Bind a delayed-task callback.  It receives the payload's zone and the
    /// agent store.  Duplicate names fail at `build`.
    pub fn callback<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(Resolved<'_, Zone>, &mut AgentStore, &DelayedTask, &mut Rearm) -> Result<(), CallbackError>
            + Send
            + Sync
            + 'static,
    {
        if let Err(e) = self.delayed.register_callback(name, callback) {
            self.error.get_or_insert(e.into());
        }
        self
    }

    /// Queue a delayed task.  Its callback may be registered before or after.
    pub fn delayed(mut self, name: impl Into<String>, payload: DelayPayload, fire_at: Tick) -> Self {
        self.seeds.push(DelayedTask::new(name, payload, fire_at));
        self
    }

    /// Queue delayed tasks read from a seed file.
    pub fn delayed_tasks(mut self, tasks: impl IntoIterator<Item = DelayedTask>) -> Self {
        self.seeds.extend(tasks);
        self
    }

    pub fn repository(mut self, repository: Box<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Validate inputs, seal the callback table, load any stored snapshot and
    /// return a ready-to-run [`Swarm`].
    pub fn build(self) -> SimResult<Swarm<R, W>> {
        self.config.validate()?;
        if let Some(e) = self.error {
            return Err(e);
        }

        // ── Initialization phase ends here ────────────────────────────────
        let mut delayed = self.delayed;
        delayed.restore(self.seeds)?;
        delayed.seal()?;

        let mut zones = BTreeMap::new();
        for (name, rally) in &self.zones {
            if zones.insert(name.clone(), Zone::new(name.clone(), *rally)).is_some() {
                return Err(SimError::DuplicateZone(name.clone()));
            }
        }

        let mut agents = AgentStore::new();
        for builder in self.agents {
            let id = agents.insert(builder);
            if let Some(agent) = agents.get(id) {
                if !zones.contains_key(&agent.zone) {
                    return Err(SimError::UnknownZone(agent.zone.clone()));
                }
            }
        }

        let movement = MovementEngine::new(self.router, self.config.movement.clone()).with_crossing(self.crossing);
        let runner = BehaviorRunner::new(self.strategies, self.config.seed, self.config.standby_spread);

        let mut swarm = Swarm {
            config: self.config,
            tick: Tick(0),
            zones,
            agents,
            movement,
            runner,
            delayed,
            world: self.world,
            repository: self.repository,
        };

        // ── Stored state ──────────────────────────────────────────────────
        let stored = match swarm.repository.as_mut() {
            Some(repo) => repo.load()?,
            None => None,
        };
        if let Some(snapshot) = stored {
            swarm.restore(snapshot)?;
            for (name, rally) in self.zones {
                if !swarm.zones.contains_key(&name) {
                    swarm.zones.insert(name.clone(), Zone::new(name, rally));
                }
            }
        }

        info!(
            zones = swarm.zones.len(),
            agents = swarm.agents.len(),
            delayed = swarm.delayed.len(),
            tick = %swarm.tick,
            "swarm built",
        );
        Ok(swarm)
    }
}
