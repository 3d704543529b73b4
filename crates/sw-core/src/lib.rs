//! `sw-core` — foundational types for the `rust_swarm` agent core.
//!
//! Every other `sw-*` crate depends on this one.  It has no `sw-*`
//! dependencies and only small external ones (`rand`, `serde`, `thiserror`,
//! `toml`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `JobKey`, `ObjectId`, `ZoneName`               |
//! | [`geo`]    | `Position`, `Direction`, `Tile`                           |
//! | [`time`]   | `Tick`                                                    |
//! | [`role`]   | `Role`, `JobDomain`, `JobRef`                             |
//! | [`config`] | `SwarmConfig`, `MoveConfig`                               |
//! | [`rng`]    | `AgentRng` (per-agent, deterministic)                     |
//! | [`world`]  | `World` host trait, `Action`, `ActionStatus`, `WorldObject` |
//! | [`error`]  | `SwarmError`, `SwarmResult`                               |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod role;
pub mod time;
pub mod world;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{MoveConfig, SwarmConfig};
pub use error::{SwarmError, SwarmResult};
pub use geo::{Direction, Position, Tile};
pub use ids::{AgentId, JobKey, ObjectId, ZoneName};
pub use rng::AgentRng;
pub use role::{JobDomain, JobRef, Role};
pub use time::Tick;
pub use world::{Action, ActionStatus, Cargo, ObjectKind, World, WorldObject};
