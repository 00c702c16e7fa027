//! Unified error types for Beacon

use thiserror::Error;

/// Unified error type for all Beacon operations
#[derive(Error, Debug)]
pub enum BeaconError {
    // Per-metric errors
    #[error("Classification failed: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),

    // Lifecycle errors
    #[error("Scheduling error: {0}")]
    Scheduling(String),

    #[error("Reporter already started")]
    AlreadyStarted,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A metric handle that matches none of the known kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("unrecognized metric kind for {resource_name} ({type_name})")]
    Unrecognized {
        resource_name: String,
        type_name: String,
    },
}

/// The monitoring profile refused or failed a registration call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("resource not registered: {0}")]
    UnknownResource(String),

    #[error("profile rejected {resource_name}/{attribute}: {reason}")]
    Rejected {
        resource_name: String,
        attribute: String,
        reason: String,
    },

    #[error("{operation} for {resource_name} timed out after {timeout_ms}ms")]
    TimedOut {
        operation: &'static str,
        resource_name: String,
        timeout_ms: u64,
    },
}

/// Result type alias using BeaconError
pub type Result<T> = std::result::Result<T, BeaconError>;
