//! `sw-agent` — agent records and their store.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`agent`]   | `Agent`, `Lifecycle`                                      |
//! | [`custom`]  | `CustomData` — persistent entries plus transient markers  |
//! | [`store`]   | `AgentStore` — insertion-ordered arena keyed by `AgentId` |
//! | [`builder`] | `AgentBuilder` (fluent construction)                      |
//!
//! Agents reference jobs only through [`JobRef`](sw_core::JobRef); the job
//! queues own the jobs.  The store never touches queues itself, so releasing
//! a removed agent's job slot is the caller's job (see `sw-task`).

pub mod agent;
pub mod builder;
pub mod custom;
pub mod store;


pub use agent::{Agent, Lifecycle};
pub use builder::AgentBuilder;
pub use custom::CustomData;
pub use store::AgentStore;
