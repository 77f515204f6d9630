//! Error types for the canbot crate

use thiserror::Error;

use crate::robot::{Action, BatteryLevel};

/// Main error type for the canbot crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid action: {action} is not allowed with a {level} battery")]
    InvalidAction { action: Action, level: BatteryLevel },

    #[error("unknown action '{value}' (expected search, wait or recharge)")]
    UnknownAction { value: String },

    #[error("invalid battery state '{value}' (expected high, low or dead)")]
    InvalidState { value: String },

    #[error("battery state {level} has no valid actions")]
    NoValidActions { level: BatteryLevel },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
