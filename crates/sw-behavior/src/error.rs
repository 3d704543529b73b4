use thiserror::Error;

use sw_core::AgentId;
use sw_task::{JobTag, TaskError};

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("a strategy for {0} jobs is already registered")]
    DuplicateStrategy(JobTag),

    #[error(transparent)]
    Task(#[from] TaskError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
