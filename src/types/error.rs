use thiserror::Error;

use super::RecordId;

/// subtrack error types
#[derive(Error, Debug)]
pub enum SubtrackError {
    /// Cycle length is not a positive number of days
    #[error("invalid cycle: {days} days")]
    InvalidCycle { days: i64 },

    /// Subscription references a provider absent from the snapshot
    #[error("missing provider: {0}")]
    MissingProvider(RecordId),

    /// Record holds values the store should not have accepted
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Failed to parse JSON or a command-line value
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for subtrack
pub type Result<T> = std::result::Result<T, SubtrackError>;
