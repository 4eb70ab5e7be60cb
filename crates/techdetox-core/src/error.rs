//! Core error types for techdetox-core.
//!
//! Expected failures (bad input, a missing platform capability) are turned
//! into user-facing messages where they happen. These types cover the rest:
//! configuration I/O and the capability results that feed the fallback chains.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for techdetox-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Platform capability errors
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine where the config directory lives
    #[error("Could not resolve the configuration directory")]
    NoConfigDir,

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors. The messages are shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text input was empty or whitespace
    #[error("Please enter a {field}")]
    EmptyInput { field: String },
}

/// Reject blank text input before anything else looks at it.
pub fn require_non_blank<'a>(field: &str, input: &'a str) -> Result<&'a str, ValidationError> {
    if input.trim().is_empty() {
        Err(ValidationError::EmptyInput {
            field: field.to_string(),
        })
    } else {
        Ok(input)
    }
}

/// Outcome of asking the platform to do something it may not support.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The platform does not offer this capability at all
    #[error("{capability} is not available on this platform")]
    Unavailable { capability: String },

    /// The capability exists but the call failed
    #[error("{capability} failed: {message}")]
    Failed { capability: String, message: String },
}

impl CapabilityError {
    pub fn unavailable(capability: impl Into<String>) -> Self {
        Self::Unavailable {
            capability: capability.into(),
        }
    }

    pub fn failed(capability: impl Into<String>, message: impl ToString) -> Self {
        Self::Failed {
            capability: capability.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
