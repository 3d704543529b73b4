//! Core error taxonomy.
//!
//! Sub-crates define their own error enums and either convert into
//! `SwarmError` or wrap it as one variant, whichever keeps call sites clean.
//! None of the recoverable variants ever escapes a tick: the component that
//! detects them handles them locally.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `sw-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum SwarmError {
    /// A job key, zone, or agent is missing.  Callers fall back to a default
    /// or standby behavior.
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: String },

    /// Another in-progress action on the same agent blocks this one; retried
    /// next tick.
    #[error("agent {0} is busy")]
    Busy(AgentId),

    /// A job references a destroyed or unreachable target.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Assignment beyond a job's `need`.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `sw-*` crates.
pub type SwarmResult<T> = Result<T, SwarmError>;
