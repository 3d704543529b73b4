//! `sw-sim` — tick orchestrator for the rust_swarm core.
//!
//! # One tick
//!
//! ```text
//! ① Delayed   — fire every task with fire_at <= now, (fire_at, insertion)
//!               order; callbacks may add jobs to their zone's board.
//! ② Reconcile — for each zone in name order, match idle agents to open
//!               job slots (role, need, requirement, priority).
//! ③ Agents    — for each agent in insertion order, one behavior turn:
//!                 spawning  → wait for the host to place it
//!                 no job    → walk to its standby cell
//!                 job       → prepare, then source / target phases
//! ④ Housekeep — prune the path cache, advance the host, flush the snapshot.
//! ```
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | `swarm`      | [`Swarm`]: state and the tick loop                       |
//! | `builder`    | [`SwarmBuilder`]: initialization phase                   |
//! | `zone`       | [`Zone`]: one board plus its rally point                 |
//! | `observer`   | [`SwarmObserver`], [`TickReport`]                        |
//! | `repository` | [`Snapshot`], [`Repository`] and two implementations     |
//! | `world`      | [`GridWorld`]: in-memory host with an R-tree object index |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sw_agent::AgentBuilder;
//! use sw_core::{Position, Role, SwarmConfig};
//! use sw_path::{AStarRouter, TerrainGrid};
//! use sw_sim::{GridWorld, NoopObserver, SwarmBuilder};
//!
//! let mut world = GridWorld::new();
//! world.add_zone("W1N1", TerrainGrid::new(50, 50))?;
//! let mut swarm = SwarmBuilder::new(SwarmConfig::default(), AStarRouter::default(), world)
//!     .zone("W1N1", Position::new(25, 25))
//!     .agent(AgentBuilder::new(Role::Worker, "W1N1"))
//!     .build()?;
//! swarm.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod repository;
pub mod swarm;
pub mod world;
pub mod zone;


pub use builder::SwarmBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SwarmObserver, TickReport};
pub use repository::{AgentSnapshot, JsonFileRepository, MemoryRepository, Repository, Snapshot, ZoneSnapshot};
pub use swarm::Swarm;
pub use world::GridWorld;
pub use zone::Zone;
