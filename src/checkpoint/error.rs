//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur during snapshot and restore operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot describes a different graph than the machine it is restored into
    #[error("Snapshot graph does not match the machine: {0}")]
    GraphMismatch(String),

    /// Snapshot data is internally inconsistent
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
