//! `sw-behavior` — per-agent job logic and the runner that drives it.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`strategy`] | `JobStrategy` trait, `StrategyRegistry` (`JobTag -> strategy`)    |
//! | [`builtin`]  | one strategy per `JobKind`                                        |
//! | [`context`]  | `PhaseContext<'a>` — the agent's mutable view during a phase, `JobOutcome` |
//! | [`runner`]   | `BehaviorRunner`, `AgentTurn`, `Phase`                            |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                              |
//!
//! # Design notes
//!
//! Strategies are stateless and shared by every agent; per-agent progress
//! lives on the agent (`lifecycle`, `working`, custom markers) and in the
//! movement engine.  Phases run strictly one agent at a time, so a strategy
//! may mutate the agent store and act on the world directly.

pub mod builtin;
pub mod context;
pub mod error;
pub mod runner;
pub mod strategy;


pub use context::{JobOutcome, PhaseContext};
pub use error::{BehaviorError, BehaviorResult};
pub use runner::{AgentTurn, BehaviorRunner, FinishedJob, Phase};
pub use strategy::{JobStrategy, StrategyRegistry};
