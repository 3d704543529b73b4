use thiserror::Error;

use sw_core::{AgentId, JobDomain, JobKey, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("no job matches {0}")]
    NotFound(String),

    #[error("job {0} is already at capacity")]
    CapacityExceeded(JobKey),

    #[error("agent {0} already holds a job")]
    Busy(AgentId),

    #[error("{kind} jobs belong to the {expected} queue, not {actual}")]
    WrongDomain { kind: &'static str, expected: JobDomain, actual: JobDomain },

    #[error("role {role} is not eligible for job {key}")]
    RoleMismatch { role: Role, key: JobKey },

    #[error("agent {0} lives in another zone")]
    ForeignAgent(AgentId),
}

pub type TaskResult<T> = Result<T, TaskError>;
