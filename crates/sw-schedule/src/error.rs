use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("callback {0:?} registered after initialization was sealed")]
    RegistrationClosed(String),

    #[error("callback {0:?} is already registered")]
    DuplicateCallback(String),

    #[error("pending tasks name unregistered callbacks: {0:?}")]
    UnboundTasks(Vec<String>),

    #[error("no callback registered under {0:?}")]
    UnknownCallback(String),

    #[error("delayed tasks drained before initialization was sealed")]
    NotSealed,

    #[error("delayed task parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
