//! Core error types for studybear-core.
//!
//! This module defines the error hierarchy using thiserror. A broken
//! snapshot file means an empty registry and a failed reward fetch is only
//! logged, so these types mostly travel from the storage layer to callers
//! that log them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studybear-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Snapshot file errors
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Registry contract violations
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Reward delivery errors
    #[error("Reward error: {0}")]
    Reward(#[from] RewardError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be created
    #[error("Cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Snapshot file errors.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The file could not be read
    #[error("Failed to read snapshot {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written
    #[error("Failed to write snapshot {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file contents are not a valid snapshot
    #[error("Malformed snapshot {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the registry failed
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Registry errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A member with this id is already tracked
    #[error("Member '{0}' is already tracked")]
    DuplicateMember(String),
}

/// Reward delivery errors.
#[derive(Error, Debug)]
pub enum RewardError {
    /// HTTP request failed
    #[error("Reward request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The reward API answered with a non-success status
    #[error("Reward API returned HTTP {status}")]
    Status { status: u16 },

    /// The response did not contain a usable reward
    #[error("Reward API response had no image url")]
    EmptyResponse,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
