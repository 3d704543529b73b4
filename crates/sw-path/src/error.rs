//! Routing error type.

use thiserror::Error;

use sw_core::Position;

/// Errors produced by `sw-path`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("no path from {from} to {to}")]
    NoPath { from: Position, to: Position },

    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("search budget of {ops} expansions exhausted")]
    SearchExhausted { ops: u32 },

    #[error("malformed serialized path: {0}")]
    Malformed(String),
}

pub type PathResult<T> = Result<T, PathError>;
