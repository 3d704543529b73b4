//! `GridWorld` — an in-memory host.
//!
//! Terrain comes from one [`TerrainGrid`] per zone; objects live in a flat
//! map with a per-zone, per-kind [`ObjectIndex`] (an R-tree) for nearest
//! lookups.  Actions resolve immediately.
//!
//! # Action rules
//!
//! | Action     | Target kinds                          | Range | Effect                           |
//! |------------|---------------------------------------|-------|----------------------------------|
//! | `Move`     | —                                     | —     | one step; swamp adds fatigue     |
//! | `Harvest`  | `Source`                              | 1     | up to `harvest_rate`             |
//! | `Withdraw` | anything with a store, except sources | 1     | as much as fits, or `Some(n)`    |
//! | `Transfer` | anything with a store, except sources | 1     | everything carried, or `Some(n)` |
//! | `Build`    | `ConstructionSite`                    | 3     | `work_rate` progress; removed when done |
//! | `Repair`   | damaged structures                    | 3     | `work_rate` hits                 |
//! | `Upgrade`  | `Controller`                          | 3     | `work_rate` progress             |
//! | `Sign`     | `Controller`                          | 1     | —                                |
//! | `Attack`   | `Hostile`                             | 1     | `attack_power` damage; removed at 0 |
//!
//! An agent gets one move and one other action per tick; a second request
//! of either kind answers [`ActionStatus::Busy`] until [`World::advance`].

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use sw_core::{
    Action, ActionStatus, AgentId, Cargo, ObjectId, ObjectKind, Position, SwarmError, Tick, Tile, World,
    WorldObject, ZoneName,
};
use sw_path::{ObjectIndex, TerrainGrid, TileSource};

use crate::{SimError, SimResult};

// ── Per-zone state ────────────────────────────────────────────────────────────

struct ZoneState {
    terrain:   TerrainGrid,
    index:     FxHashMap<ObjectKind, ObjectIndex>,
    /// Blocking objects per cell.
    obstacles: FxHashMap<Position, u32>,
    occupants: FxHashMap<Position, AgentId>,
}

impl ZoneState {
    fn new(terrain: TerrainGrid) -> Self {
        Self {
            terrain,
            index:     FxHashMap::default(),
            obstacles: FxHashMap::default(),
            occupants: FxHashMap::default(),
        }
    }
}

struct Body {
    zone:    ZoneName,
    pos:     Position,
    cargo:   Cargo,
    fatigue: u32,
    moved:   bool,
    acted:   bool,
}

// ── GridWorld ─────────────────────────────────────────────────────────────────

pub struct GridWorld {
    tick:        Tick,
    zones:       BTreeMap<ZoneName, ZoneState>,
    objects:     BTreeMap<ObjectId, WorldObject>,
    bodies:      BTreeMap<AgentId, Body>,
    next_object: ObjectId,

    /// Cargo capacity of newly placed agents.
    pub carry_capacity: u32,
    pub harvest_rate:   u32,
    /// Energy spent per build/repair/upgrade.
    pub work_rate:      u32,
    pub attack_power:   u32,
    /// Fatigue gained by stepping onto a swamp; one point wears off per tick.
    pub swamp_fatigue:  u32,
}

impl Default for GridWorld {
    fn default() -> Self {
        Self {
            tick:           Tick(0),
            zones:          BTreeMap::new(),
            objects:        BTreeMap::new(),
            bodies:         BTreeMap::new(),
            next_object:    ObjectId(0),
            carry_capacity: 50,
            harvest_rate:   10,
            work_rate:      5,
            attack_power:   30,
            swamp_fatigue:  2,
        }
    }
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    pub fn add_zone(&mut self, name: impl Into<ZoneName>, terrain: TerrainGrid) -> SimResult<()> {
        let name = name.into();
        if self.zones.contains_key(&name) {
            return Err(SimError::DuplicateZone(name));
        }
        self.zones.insert(name, ZoneState::new(terrain));
        Ok(())
    }

    /// Add an object with an empty store and one hit point.  Use
    /// [`set_store`](Self::set_store) and [`set_hits`](Self::set_hits) to
    /// shape it.
    pub fn add_object(&mut self, zone: impl Into<ZoneName>, kind: ObjectKind, pos: Position) -> SimResult<ObjectId> {
        let zone = zone.into();
        let state = self.zones.get_mut(&zone).ok_or_else(|| SimError::UnknownZone(zone.clone()))?;
        if !state.terrain.contains(pos) {
            return Err(SwarmError::InvalidTarget(format!("{pos} is outside {zone}")).into());
        }
        let id = self.next_object;
        self.next_object = id.next();

        state.index.entry(kind).or_default().insert(pos, id);
        if kind.blocks_movement() {
            *state.obstacles.entry(pos).or_default() += 1;
        }
        self.objects.insert(id, WorldObject {
            id,
            kind,
            zone,
            pos,
            stored: 0,
            capacity: 0,
            hits: 1,
            hits_max: 1,
        });
        Ok(id)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<WorldObject> {
        let obj = self.objects.remove(&id)?;
        if let Some(state) = self.zones.get_mut(&obj.zone) {
            if let Some(index) = state.index.get_mut(&obj.kind) {
                index.remove(obj.pos, id);
            }
            if obj.kind.blocks_movement() {
                if let Some(n) = state.obstacles.get_mut(&obj.pos) {
                    *n -= 1;
                    if *n == 0 {
                        state.obstacles.remove(&obj.pos);
                    }
                }
            }
        }
        Some(obj)
    }

    /// Set the energy store of an object.  `false` if it does not exist.
    pub fn set_store(&mut self, id: ObjectId, stored: u32, capacity: u32) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.stored = stored;
                obj.capacity = capacity;
                true
            }
            None => false,
        }
    }

    /// Set durability (or build progress for sites).
    pub fn set_hits(&mut self, id: ObjectId, hits: u32, hits_max: u32) -> bool {
        match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.hits = hits;
                obj.hits_max = hits_max;
                true
            }
            None => false,
        }
    }

    /// Put `agent` on the map.  Until then it is spawning.
    pub fn place_agent(&mut self, agent: AgentId, zone: impl Into<ZoneName>, pos: Position) -> SimResult<()> {
        let zone = zone.into();
        let state = self.zones.get_mut(&zone).ok_or_else(|| SimError::UnknownZone(zone.clone()))?;
        if !state.terrain.tile(pos).is_walkable() || state.obstacles.contains_key(&pos) {
            return Err(SwarmError::InvalidTarget(format!("{pos} in {zone} is not walkable")).into());
        }
        if state.occupants.get(&pos).is_some_and(|&other| other != agent) {
            return Err(SwarmError::InvalidTarget(format!("{pos} in {zone} is occupied")).into());
        }
        self.remove_agent(agent);
        let state = self.zones.get_mut(&zone).ok_or_else(|| SimError::UnknownZone(zone.clone()))?;
        state.occupants.insert(pos, agent);
        self.bodies.insert(agent, Body {
            zone,
            pos,
            cargo: Cargo { amount: 0, capacity: self.carry_capacity },
            fatigue: 0,
            moved: false,
            acted: false,
        });
        Ok(())
    }

    /// Take `agent` off the map.  `false` if it was not placed.
    pub fn remove_agent(&mut self, agent: AgentId) -> bool {
        let Some(body) = self.bodies.remove(&agent) else { return false };
        if let Some(state) = self.zones.get_mut(&body.zone) {
            state.occupants.remove(&body.pos);
        }
        true
    }

    /// Set how much energy `agent` carries, clamped to its capacity.
    pub fn set_cargo(&mut self, agent: AgentId, amount: u32) -> bool {
        match self.bodies.get_mut(&agent) {
            Some(body) => {
                body.cargo.amount = amount.min(body.cargo.capacity);
                true
            }
            None => false,
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = &WorldObject> + '_ {
        self.objects.values()
    }

    pub fn agent_count(&self) -> usize {
        self.bodies.len()
    }

    // ── Action resolution ─────────────────────────────────────────────────

    fn step_agent(&mut self, agent: AgentId, dir: sw_core::Direction) -> ActionStatus {
        let Some(body) = self.bodies.get_mut(&agent) else {
            return ActionStatus::NotFound;
        };
        if body.moved {
            return ActionStatus::Busy;
        }
        if body.fatigue > 0 {
            return ActionStatus::Tired;
        }
        let Some(state) = self.zones.get_mut(&body.zone) else {
            return ActionStatus::NotFound;
        };
        let next = body.pos.step(dir);
        let tile = state.terrain.tile(next);
        if !state.terrain.contains(next) || !tile.is_walkable() || state.obstacles.contains_key(&next) {
            return ActionStatus::Blocked;
        }
        if state.occupants.contains_key(&next) {
            return ActionStatus::Blocked;
        }
        state.occupants.remove(&body.pos);
        state.occupants.insert(next, agent);
        body.pos = next;
        body.moved = true;
        if tile == Tile::Swamp {
            body.fatigue = self.swamp_fatigue;
        }
        ActionStatus::Ok
    }

    fn work(&mut self, agent: AgentId, action: &Action) -> ActionStatus {
        let Some(body) = self.bodies.get_mut(&agent) else {
            return ActionStatus::NotFound;
        };
        let target = match *action {
            Action::Move(_) => return ActionStatus::InvalidTarget,
            Action::Harvest(id)
            | Action::Withdraw(id, _)
            | Action::Transfer(id, _)
            | Action::Build(id)
            | Action::Repair(id)
            | Action::Upgrade(id)
            | Action::Sign(id, _)
            | Action::Attack(id) => id,
        };
        let Some(obj) = self.objects.get_mut(&target) else {
            return ActionStatus::InvalidTarget;
        };
        if !accepts(action, obj) {
            return ActionStatus::InvalidTarget;
        }
        let range = match action {
            Action::Build(_) | Action::Repair(_) | Action::Upgrade(_) => 3,
            _ => 1,
        };
        if obj.zone != body.zone || !body.pos.in_range_to(obj.pos, range) {
            return ActionStatus::NotInRange;
        }
        if body.acted {
            return ActionStatus::Busy;
        }

        let cargo = &mut body.cargo;
        let status = match *action {
            Action::Harvest(_) | Action::Withdraw(..) => {
                let cap = match *action {
                    Action::Harvest(_) => self.harvest_rate,
                    Action::Withdraw(_, Some(n)) => n,
                    _ => u32::MAX,
                };
                let n = cap.min(obj.stored).min(cargo.free());
                if obj.stored == 0 {
                    ActionStatus::NotEnoughResources
                } else if n == 0 {
                    ActionStatus::Full
                } else {
                    obj.stored -= n;
                    cargo.amount += n;
                    ActionStatus::Ok
                }
            }
            Action::Transfer(_, amount) => {
                let n = amount.unwrap_or(cargo.amount).min(cargo.amount).min(obj.free_capacity());
                if cargo.is_empty() {
                    ActionStatus::NotEnoughResources
                } else if n == 0 {
                    ActionStatus::Full
                } else {
                    obj.stored += n;
                    cargo.amount -= n;
                    ActionStatus::Ok
                }
            }
            Action::Build(_) | Action::Repair(_) | Action::Upgrade(_) => {
                if cargo.is_empty() {
                    ActionStatus::NotEnoughResources
                } else {
                    let spent = self.work_rate.min(cargo.amount);
                    cargo.amount -= spent;
                    match action {
                        Action::Upgrade(_) => obj.stored += spent,
                        _ => obj.hits = (obj.hits + spent).min(obj.hits_max),
                    }
                    ActionStatus::Ok
                }
            }
            Action::Attack(_) => {
                obj.hits = obj.hits.saturating_sub(self.attack_power);
                ActionStatus::Ok
            }
            Action::Sign(..) | Action::Move(_) => ActionStatus::Ok,
        };
        if status.is_ok() {
            body.acted = true;
        }

        let finished = match action {
            Action::Build(_) => obj.hits >= obj.hits_max,
            Action::Attack(_) => obj.hits == 0,
            _ => false,
        };
        if finished {
            self.remove_object(target);
        }
        status
    }
}

/// `true` if `action` may target `obj` at all.
fn accepts(action: &Action, obj: &WorldObject) -> bool {
    use ObjectKind::*;
    match action {
        Action::Harvest(_) => obj.kind == Source,
        Action::Withdraw(..) | Action::Transfer(..) => obj.kind != Source && obj.capacity > 0,
        Action::Build(_) => obj.kind == ConstructionSite,
        Action::Repair(_) => !matches!(obj.kind, Source | Controller | ConstructionSite | Hostile),
        Action::Upgrade(_) | Action::Sign(..) => obj.kind == Controller,
        Action::Attack(_) => obj.kind == Hostile,
        Action::Move(_) => false,
    }
}

impl World for GridWorld {
    fn tick(&self) -> Tick {
        self.tick
    }

    fn zone_size(&self, zone: &ZoneName) -> Option<(i32, i32)> {
        self.zones.get(zone).map(|z| z.terrain.size())
    }

    fn tile(&self, zone: &ZoneName, pos: Position) -> Tile {
        self.zones.get(zone).map_or(Tile::Wall, |z| z.terrain.tile(pos))
    }

    fn is_obstructed(&self, zone: &ZoneName, pos: Position) -> bool {
        self.zones.get(zone).is_some_and(|z| z.obstacles.contains_key(&pos))
    }

    fn position_of(&self, agent: AgentId) -> Option<Position> {
        self.bodies.get(&agent).map(|b| b.pos)
    }

    fn cargo(&self, agent: AgentId) -> Cargo {
        self.bodies.get(&agent).map(|b| b.cargo).unwrap_or_default()
    }

    fn occupant(&self, zone: &ZoneName, pos: Position) -> Option<AgentId> {
        self.zones.get(zone).and_then(|z| z.occupants.get(&pos).copied())
    }

    fn object(&self, id: ObjectId) -> Option<WorldObject> {
        self.objects.get(&id).cloned()
    }

    fn find_nearest(
        &self,
        zone:   &ZoneName,
        from:   Position,
        kind:   ObjectKind,
        filter: &dyn Fn(&WorldObject) -> bool,
    ) -> Option<WorldObject> {
        let index = self.zones.get(zone)?.index.get(&kind)?;
        index
            .nearest(from)
            .filter_map(|(id, _)| self.objects.get(&id))
            .find(|o| filter(*o))
            .cloned()
    }

    fn act(&mut self, agent: AgentId, action: Action) -> ActionStatus {
        match action {
            Action::Move(dir) => self.step_agent(agent, dir),
            _ => self.work(agent, &action),
        }
    }

    fn advance(&mut self) {
        self.tick = self.tick.next();
        for body in self.bodies.values_mut() {
            body.moved = false;
            body.acted = false;
            body.fatigue = body.fatigue.saturating_sub(1);
        }
    }
}
