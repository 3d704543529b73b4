use thiserror::Error;

use sw_core::{AgentId, ZoneName};
use sw_path::PathError;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("agent {0} is not known to the world")]
    NotPlaced(AgentId),

    #[error("zone {0} has no terrain")]
    UnknownZone(ZoneName),

    #[error("routing failed: {0}")]
    Routing(#[from] PathError),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
