//! The host world as seen by the core.
//!
//! Finding objects, resolving actions and owning the clock are the host's
//! business.  The core only consumes this trait: every strategy, the movement
//! engine and the tick loop talk to the world through `&dyn World` /
//! `&mut dyn World`, so the trait stays object safe.

use serde::{Deserialize, Serialize};

use crate::{AgentId, Direction, ObjectId, Position, Tick, Tile, ZoneName};

// ── Objects ───────────────────────────────────────────────────────────────────

/// Kind of a host object.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Source,
    Storage,
    Container,
    Extension,
    Tower,
    Spawn,
    Controller,
    ConstructionSite,
    Wall,
    Hostile,
}

impl ObjectKind {
    /// `true` if agents cannot stand on a cell holding this object.
    pub fn blocks_movement(self) -> bool {
        !matches!(self, ObjectKind::Container | ObjectKind::ConstructionSite)
    }

    /// `true` for kinds agents may withdraw energy from.
    pub fn is_energy_source(self) -> bool {
        matches!(self, ObjectKind::Storage | ObjectKind::Container | ObjectKind::Source)
    }
}

/// Read-only snapshot of a host object.
///
/// `stored`/`capacity` describe the energy store (sources, storages,
/// extensions, towers); `hits`/`hits_max` describe durability, or build
/// progress for construction sites.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObject {
    pub id:       ObjectId,
    pub kind:     ObjectKind,
    pub zone:     ZoneName,
    pub pos:      Position,
    pub stored:   u32,
    pub capacity: u32,
    pub hits:     u32,
    pub hits_max: u32,
}

impl WorldObject {
    #[inline]
    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.stored)
    }

    #[inline]
    pub fn is_damaged(&self) -> bool {
        self.hits < self.hits_max
    }
}

/// Energy an agent is carrying.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Cargo {
    pub amount:   u32,
    pub capacity: u32,
}

impl Cargo {
    #[inline]
    pub fn is_empty(self) -> bool {
        self.amount == 0
    }

    #[inline]
    pub fn is_full(self) -> bool {
        self.amount >= self.capacity
    }

    #[inline]
    pub fn free(self) -> u32 {
        self.capacity.saturating_sub(self.amount)
    }
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// A request an agent makes of the host this tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Harvest(ObjectId),
    /// Take up to `Some(n)` energy, or as much as fits.
    Withdraw(ObjectId, Option<u32>),
    /// Give up to `Some(n)` energy, or everything carried.
    Transfer(ObjectId, Option<u32>),
    Build(ObjectId),
    Repair(ObjectId),
    Upgrade(ObjectId),
    Sign(ObjectId, String),
    Attack(ObjectId),
}

/// Host verdict on an [`Action`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ActionStatus {
    Ok,
    NotInRange,
    /// Another action already occupies the agent this tick.
    Busy,
    InvalidTarget,
    NotEnoughResources,
    Full,
    Tired,
    /// The destination cell of a move is occupied or impassable.
    Blocked,
    /// The acting agent is unknown to the host.
    NotFound,
}

impl ActionStatus {
    #[inline]
    pub fn is_ok(self) -> bool {
        matches!(self, ActionStatus::Ok)
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Query and action surface of the simulation host.
pub trait World {
    /// Current tick number.
    fn tick(&self) -> Tick;

    /// `(width, height)` of a zone, or `None` if the host does not know it.
    fn zone_size(&self, zone: &ZoneName) -> Option<(i32, i32)>;

    /// Terrain of one cell.  Out-of-bounds cells read as [`Tile::Wall`].
    fn tile(&self, zone: &ZoneName, pos: Position) -> Tile;

    /// `true` if a blocking object stands on `pos`.
    fn is_obstructed(&self, zone: &ZoneName, pos: Position) -> bool;

    /// Where the agent stands, or `None` while it is still spawning (or gone).
    fn position_of(&self, agent: AgentId) -> Option<Position>;

    fn cargo(&self, agent: AgentId) -> Cargo;

    /// The agent standing on `pos`, if any.
    fn occupant(&self, zone: &ZoneName, pos: Position) -> Option<AgentId>;

    fn object(&self, id: ObjectId) -> Option<WorldObject>;

    /// Nearest object of `kind` in `zone` satisfying `filter`.
    fn find_nearest(
        &self,
        zone:   &ZoneName,
        from:   Position,
        kind:   ObjectKind,
        filter: &dyn Fn(&WorldObject) -> bool,
    ) -> Option<WorldObject>;

    /// Perform `action` for `agent`.
    fn act(&mut self, agent: AgentId, action: Action) -> ActionStatus;

    /// Called by the loop driver after a full pass.  Hosts that own their own
    /// clock ignore it.
    fn advance(&mut self) {}
}
