//! `move_toward`: path following with cache reuse, waypoints, stuck
//! detection and crossing negotiation.

use tracing::debug;

use sw_agent::AgentStore;
use sw_core::{Action, ActionStatus, AgentId, MoveConfig, Position, Tick, Tile, World, ZoneName};
use sw_path::{CostMatrix, GridPath, PathCache, PathKey, Router, SearchRequest, TileSource};

use crate::{
    CrossingDecision, CrossingPolicy, MobilityError, MobilityResult, MobilityStore, MovementRecord,
    Repath,
};

// ── Options / status ──────────────────────────────────────────────────────────

/// Per-call movement options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Stop once within this Chebyshev distance of the target.
    pub range: u32,

    /// Cells to pass (within `waypoint_tolerance`) before heading to the
    /// target, in order.
    pub waypoints: Vec<Position>,

    /// Never wait for other agents to yield; route around them instead.
    pub disable_crossing: bool,

    /// Neither read nor write the shared path cache.
    pub disable_cache: bool,

    /// Override of `MoveConfig::max_search_cost`.
    pub max_search_cost: Option<u32>,
}

impl MoveOptions {
    pub fn range(range: u32) -> Self {
        Self { range, ..Self::default() }
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Position>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn no_crossing(mut self) -> Self {
        self.disable_crossing = true;
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.disable_cache = true;
        self
    }

    pub fn max_search_cost(mut self, ops: u32) -> Self {
        self.max_search_cost = Some(ops);
        self
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MoveStatus {
    /// Within range of the target; no action issued.
    Arrived,
    /// A step was issued.
    Moving,
    /// Blocked by an agent expected to yield; retrying next tick.
    Waiting,
    /// The host refused the step because the agent is fatigued.
    Tired,
    NoPath,
    /// The agent is unknown or not placed in the world.
    NotFound,
}

impl MoveStatus {
    /// `true` for statuses that leave the agent on its way.
    #[inline]
    pub fn in_progress(self) -> bool {
        matches!(self, MoveStatus::Moving | MoveStatus::Waiting | MoveStatus::Tired)
    }
}

// ── Mover trait ───────────────────────────────────────────────────────────────

/// Object-safe movement surface handed to behavior code.
pub trait Mover {
    fn move_toward(
        &mut self,
        agent:  AgentId,
        target: Position,
        opts:   &MoveOptions,
        agents: &mut AgentStore,
        world:  &mut dyn World,
    ) -> MoveStatus;

    /// Drop the movement state of `agent` (removal, job change).
    fn forget(&mut self, agent: AgentId);
}

// ── World adapter ─────────────────────────────────────────────────────────────

struct WorldTiles<'a> {
    world: &'a dyn World,
    zone:  &'a ZoneName,
    size:  (i32, i32),
}

impl TileSource for WorldTiles<'_> {
    fn size(&self) -> (i32, i32) {
        self.size
    }

    fn tile(&self, pos: Position) -> Tile {
        self.world.tile(self.zone, pos)
    }

    fn is_obstructed(&self, pos: Position) -> bool {
        self.world.is_obstructed(self.zone, pos)
    }
}

// ── MovementEngine ────────────────────────────────────────────────────────────

/// Wraps a [`Router`], the per-agent [`MobilityStore`], the shared
/// [`PathCache`] and the [`CrossingPolicy`].
///
/// # Type parameter
///
/// `R` must implement [`Router`] (e.g. [`sw_path::AStarRouter`]).
pub struct MovementEngine<R: Router> {
    pub router:   R,
    pub store:    MobilityStore,
    pub cache:    PathCache,
    pub crossing: CrossingPolicy,
    pub config:   MoveConfig,
}

impl<R: Router> MovementEngine<R> {
    pub fn new(router: R, config: MoveConfig) -> Self {
        Self {
            router,
            store:    MobilityStore::new(),
            cache:    PathCache::new(config.reuse_limit, config.cache_ttl_ticks),
            crossing: CrossingPolicy::new(),
            config,
        }
    }

    pub fn with_crossing(mut self, crossing: CrossingPolicy) -> Self {
        self.crossing = crossing;
        self
    }

    /// Evict idle shared cache entries.  Called once per tick by the loop.
    pub fn prune_cache(&mut self, now: Tick) -> usize {
        self.cache.prune(now)
    }

    /// Step `agent` one cell toward `target`.
    pub fn move_toward(
        &mut self,
        agent_id: AgentId,
        target:   Position,
        opts:     &MoveOptions,
        agents:   &mut AgentStore,
        world:    &mut dyn World,
    ) -> MoveStatus {
        let Some(agent) = agents.get(agent_id) else {
            return MoveStatus::NotFound;
        };
        let zone = agent.zone.clone();
        let Some(pos) = world.position_of(agent_id) else {
            return MoveStatus::NotFound;
        };
        let now = world.tick();

        // 1. Goal change resets the record.
        let hash = MovementRecord::hash_target(target, opts.range, &opts.waypoints);
        let rec = self.store.entry(agent_id);
        if rec.target_hash != hash || rec.waypoints != opts.waypoints {
            rec.reset(hash, opts.waypoints.clone());
        }

        // 2. Verify the previous step.
        let mut retrying = false;
        if let (Some(last), Some(dir)) = (rec.last_position, rec.last_direction) {
            if pos == last {
                let blocked = pos.step(dir);
                match world.occupant(&zone, blocked).filter(|&o| o != agent_id) {
                    Some(occupant_id) => {
                        let decision = match (agents.get(occupant_id), agents.get(agent_id)) {
                            (Some(occupant), Some(requester)) if !opts.disable_crossing => {
                                self.crossing.decide(occupant, requester)
                            }
                            _ => CrossingDecision::Deny,
                        };
                        if decision == CrossingDecision::Allow
                            && rec.stuck_ticks < self.config.max_stuck_ticks
                        {
                            rec.stuck_ticks += 1;
                            retrying = true;
                        } else {
                            debug!(agent = %agent_id, occupant = %occupant_id, ?decision, "routing around agent");
                            rec.clear_path();
                            rec.stuck_ticks = 0;
                            rec.repath = Repath::AvoidAgents;
                        }
                    }
                    None if world.is_obstructed(&zone, blocked)
                        || !world.tile(&zone, blocked).is_walkable() =>
                    {
                        debug!(agent = %agent_id, at = %blocked, "step obstructed, repathing");
                        rec.clear_path();
                        rec.stuck_ticks = 0;
                        rec.repath = Repath::Fresh;
                    }
                    // The cell has cleared since the failed step.
                    None => retrying = true,
                }
            } else {
                if pos == last.step(dir) {
                    rec.pop_step();
                } else {
                    // Displaced by the host; the remaining steps no longer
                    // start here.
                    rec.path.clear();
                }
                rec.stuck_ticks = 0;
                rec.last_position = None;
                rec.last_direction = None;
            }
        }

        // 3. Waypoints, then the target itself.
        while let Some(wp) = rec.current_waypoint() {
            if !pos.in_range_to(wp, self.config.waypoint_tolerance) {
                break;
            }
            rec.waypoint_cursor += 1;
            rec.clear_path();
        }
        let (goal, range) = match rec.current_waypoint() {
            Some(wp) => (wp, self.config.waypoint_tolerance),
            None => (target, opts.range),
        };
        if rec.current_waypoint().is_none() && pos.in_range_to(target, opts.range) {
            rec.clear_path();
            rec.stuck_ticks = 0;
            return MoveStatus::Arrived;
        }

        // 4. Reuse the current path while unexpired.
        if rec.path.is_empty() || rec.uses >= self.config.reuse_limit {
            let repath = std::mem::take(&mut rec.repath);
            let search = Search {
                zone: &zone,
                from: pos,
                goal,
                range,
                repath,
                use_cache: !opts.disable_cache,
                max_ops: opts.max_search_cost.unwrap_or(self.config.max_search_cost),
                now,
                agent: agent_id,
            };
            match find_path(&self.router, &mut self.cache, &*world, agents, &search) {
                Ok(path) if path.is_empty() => {
                    rec.clear_path();
                    return MoveStatus::Arrived;
                }
                Ok(path) => {
                    rec.path = path.serialize();
                    rec.uses = 0;
                }
                Err(e) => {
                    debug!(agent = %agent_id, %goal, error = %e, "no path");
                    rec.clear_path();
                    return MoveStatus::NoPath;
                }
            }
        }

        // 5. Issue the step.
        let Some(dir) = rec.next_step() else {
            rec.clear_path();
            return MoveStatus::NoPath;
        };
        if !retrying {
            rec.uses += 1;
        }
        let status = world.act(agent_id, Action::Move(dir));
        let outcome = match status {
            ActionStatus::Ok => {
                rec.last_position = Some(pos);
                rec.last_direction = Some(dir);
                MoveStatus::Moving
            }
            ActionStatus::Blocked => {
                rec.last_position = Some(pos);
                rec.last_direction = Some(dir);
                MoveStatus::Waiting
            }
            ActionStatus::Tired => {
                rec.uses = rec.uses.saturating_sub(1);
                MoveStatus::Tired
            }
            ActionStatus::NotFound => MoveStatus::NotFound,
            _ => {
                rec.clear_path();
                MoveStatus::NoPath
            }
        };
        if let Some(agent) = agents.get_mut(agent_id) {
            agent.standing = false;
        }
        outcome
    }
}

impl<R: Router> Mover for MovementEngine<R> {
    fn move_toward(
        &mut self,
        agent:  AgentId,
        target: Position,
        opts:   &MoveOptions,
        agents: &mut AgentStore,
        world:  &mut dyn World,
    ) -> MoveStatus {
        MovementEngine::move_toward(self, agent, target, opts, agents, world)
    }

    fn forget(&mut self, agent: AgentId) {
        self.store.remove(agent);
    }
}

// ── Path search ───────────────────────────────────────────────────────────────

/// Cache tag for paths that treat other agents as impassable.
pub const AVOID_AGENTS: &str = "avoid_agents";

struct Search<'a> {
    zone:      &'a ZoneName,
    from:      Position,
    goal:      Position,
    range:     u32,
    repath:    Repath,
    use_cache: bool,
    max_ops:   u32,
    now:       Tick,
    agent:     AgentId,
}

fn find_path<R: Router>(
    router: &R,
    cache:  &mut PathCache,
    world:  &dyn World,
    agents: &AgentStore,
    search: &Search<'_>,
) -> MobilityResult<GridPath> {
    let avoid_agents = search.repath == Repath::AvoidAgents;
    let mut key = PathKey::new(search.zone.clone(), search.from, search.goal, search.range);
    if avoid_agents {
        key = key.with_constraints(AVOID_AGENTS);
    }
    let cacheable = search.use_cache;

    if cacheable && search.repath != Repath::Fresh {
        if let Some(path) = cache.get(&key, search.now) {
            return Ok(path);
        }
    }

    let size = world
        .zone_size(search.zone)
        .ok_or_else(|| MobilityError::UnknownZone(search.zone.clone()))?;
    let tiles = WorldTiles { world, zone: search.zone, size };

    let mut costs = CostMatrix::new();
    if avoid_agents {
        for other in agents.in_zone(search.zone).filter(|a| a.id != search.agent) {
            if let Some(p) = world.position_of(other.id) {
                costs.block(p);
            }
        }
    }
    let mut req = SearchRequest::new(search.from, search.goal)
        .range(search.range)
        .max_ops(search.max_ops);
    if avoid_agents {
        req = req.costs(&costs);
    }

    let path = router.route(&tiles, &req)?;
    debug!(
        agent = %search.agent,
        from = %search.from,
        goal = %search.goal,
        steps = path.len(),
        avoid_agents,
        "path computed"
    );
    if cacheable {
        cache.insert(key, &path, search.now);
    }
    Ok(path)
}
