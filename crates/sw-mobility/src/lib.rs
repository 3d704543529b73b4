//! `sw-mobility` — agent movement over the tile grid.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`record`]   | `MovementRecord` — per-agent path, progress and stuck state     |
//! | [`store`]    | `MobilityStore` — `AgentId → MovementRecord`                    |
//! | [`crossing`] | `CrossingPolicy`, `CrossingDecision` — right-of-way rules       |
//! | [`engine`]   | `MovementEngine<R>`, `MoveOptions`, `MoveStatus`, `Mover`       |
//! | [`error`]    | `MobilityError`, `MobilityResult<T>`                            |
//!
//! # Movement model
//!
//! One call to `move_toward` issues at most one `Action::Move` to the host.
//! Progress is verified on the *next* call: if the agent is still where it
//! was before its last step, the step failed and the engine decides, from
//! what is standing in the way, whether to wait or to route around it.
//!
//! ```text
//! hash(target, range, waypoints) changed? ──▶ reset record
//!        │
//!        ▼
//! moved since last call? ── no ──▶ agent in the way? ── yes ──▶ CrossingPolicy
//!        │                              │                     allow: Waiting
//!        │ yes                          │ no                  deny:  repath around agents
//!        ▼                              ▼
//! follow / recompute path        repath (fresh search)
//! ```

pub mod crossing;
pub mod engine;
pub mod error;
pub mod record;
pub mod store;


pub use crossing::{CrossingDecision, CrossingPolicy, CrossingRule, TREATING_MARKER};
pub use engine::{AVOID_AGENTS, MoveOptions, MoveStatus, MovementEngine, Mover};
pub use error::{MobilityError, MobilityResult};
pub use record::{MovementRecord, Repath};
pub use store::MobilityStore;
