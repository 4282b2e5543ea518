//! Error types for the service host adapter.

use crate::lifecycle::{LifecycleEvent, LifecycleState};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for host adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service host adapter errors
#[derive(Debug, Error)]
pub enum Error {
    /// The service option is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A lifecycle event arrived in a state that cannot accept it
    #[error("Invalid lifecycle transition: cannot {event} while {from}")]
    InvalidTransition {
        from: LifecycleState,
        event: LifecycleEvent,
    },

    /// The application service failed inside a lifecycle callback
    #[error("Service failed during {event}: {source}")]
    Callback {
        event: LifecycleEvent,
        #[source]
        source: anyhow::Error,
    },

    /// The application service ended without being asked to stop
    #[error("Service exited unexpectedly: {0}")]
    Exited(#[source] anyhow::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Failed to parse {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Create a configuration error for an empty or missing field
    pub fn missing(field: &str) -> Self {
        Error::Configuration(format!("'{}' must not be null or empty", field))
    }

    /// Whether this error was raised while validating configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
