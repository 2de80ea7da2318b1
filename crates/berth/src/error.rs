//! Error types for berth CLI operations.

use crate::domain::{OwnerId, ServiceId, SystemId};
use std::io;
use thiserror::Error;

/// The error type for berth operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization or parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The working directory is not inside a berth repository.
    #[error("Not a berth repository (run `berth init` first)")]
    NotInitialized,

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Service not found by id or name.
    #[error("Service not found: {0}")]
    ServiceNotFound(ServiceId),

    /// System not found by id or name.
    #[error("System not found: {0}")]
    SystemNotFound(SystemId),

    /// Owner not found by id or name.
    #[error("Owner not found: {0}")]
    OwnerNotFound(OwnerId),

    /// Dependency edge not found between two services.
    #[error("No dependency from {from} to {to}")]
    DependencyNotFound {
        /// The declaring service
        from: ServiceId,
        /// The dependency target
        to: ServiceId,
    },

    /// A name lookup matched more than one record of the same kind.
    #[error("Name '{name}' is ambiguous: {count} records match; use an id instead")]
    AmbiguousName {
        /// The name that was looked up
        name: String,
        /// Number of records sharing it
        count: usize,
    },
}

/// A specialized Result type for berth operations.
pub type Result<T> = std::result::Result<T, Error>;
