use thiserror::Error;

use sw_behavior::BehaviorError;
use sw_core::{AgentId, SwarmError, ZoneName};
use sw_schedule::ScheduleError;
use sw_task::TaskError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("swarm configuration error: {0}")]
    Config(String),

    #[error("zone {0} is not managed by this swarm")]
    UnknownZone(ZoneName),

    #[error("zone {0} registered twice")]
    DuplicateZone(ZoneName),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error(transparent)]
    Core(#[from] SwarmError),

    #[error("delayed task error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("task error: {0}")]
    Task(#[from] TaskError),

    #[error("behavior error: {0}")]
    Behavior(#[from] BehaviorError),

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
