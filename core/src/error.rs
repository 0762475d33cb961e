use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid time '{value}': expected HH:MM")]
    InvalidTime { value: String },

    #[error("Invalid date '{value}'")]
    InvalidDate { value: String },

    #[error("Malformed staff record: {reason}")]
    MalformedStaff { reason: String },

    #[error("Cannot locate job '{job_id}': {reason}")]
    Locator { job_id: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
