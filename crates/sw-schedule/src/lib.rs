//! `sw-schedule` — delayed tasks that re-arm work a fixed number of ticks
//! ahead.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`task`]     | `DelayedTask`, `DelayPayload`                               |
//! | [`registry`] | `DelayedTaskRegistry<Z, S>`, `Rearm`, `Resolved`, `DrainReport` |
//! | [`loader`]   | `load_delayed_csv`, `load_delayed_reader`                   |
//! | [`error`]    | `ScheduleError`, `ScheduleResult<T>`                        |
//!
//! # Lifecycle
//!
//! ```text
//! init:   register_callback(name, cb)…   schedule(…)…   seal()
//! tick t: drain_due(t, zones)  — fires every task with fire_at ≤ t, once
//! ```
//!
//! Callbacks are bound by name during initialization only.  A task is
//! removed before its callback runs; a callback that wants to run again
//! schedules itself through the [`Rearm`] handle it is given.

pub mod error;
pub mod loader;
pub mod registry;
pub mod task;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use loader::{load_delayed_csv, load_delayed_reader};
pub use registry::{CallbackError, DelayedCallback, DelayedTaskRegistry, DrainReport, Rearm, Resolved};
pub use task::{DelayPayload, DelayedTask};
