//! Custom error types for profile storage.
//!
//! This module provides error handling for backend I/O, snapshot
//! serialization, configuration loading and user input validation.
//! The profile store itself never surfaces these to its callers.

use thiserror::Error;

/// Main error type for profile operations.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A key-value backend failed to read or write.
    #[error("Storage error in {backend}: {message}")]
    Storage { backend: String, message: String },

    /// Snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file is missing a directory or is malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform identifier is not part of the catalog.
    #[error("Unknown platform '{0}'. Run `platforms` to see the catalog.")]
    UnknownPlatform(String),

    /// No profile with the given id exists.
    #[error("Profile {0} not found")]
    ProfileNotFound(uuid::Uuid),

    /// Platform already holds the maximum number of profiles.
    #[error("{platform} already has {max} profiles")]
    ProfileLimitReached { platform: String, max: usize },

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ProfileError {
    /// Build a storage error tagged with the backend label.
    pub fn storage(backend: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ProfileError::Storage {
            backend: backend.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
