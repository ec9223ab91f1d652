//! Error types for tfimport.
//!
//! This module provides the error hierarchy for every stage of a run:
//! configuration, plan loading, Azure lookups and command execution.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tfimport.
#[derive(Debug, Error)]
pub enum TfImportError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan loading and parsing errors.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Azure Resource Manager errors.
    #[error("Azure error: {0}")]
    Azure(#[from] AzureError),

    /// Command execution errors.
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// A required setting was given neither on the command line, in the
    /// environment nor in the configuration file.
    #[error("Missing required setting: {name}")]
    MissingSetting {
        /// Name of the missing setting.
        name: String,
    },
}

/// Plan loading and parsing errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan file could not be read.
    #[error("Failed to read plan file {path}: {message}")]
    Read {
        /// Path to the plan file.
        path: PathBuf,
        /// Underlying IO error message.
        message: String,
    },

    /// The plan bytes could not be decoded with the detected encoding.
    #[error("Failed to decode plan as {encoding}: {message}")]
    Decode {
        /// Name of the detected encoding.
        encoding: String,
        /// Description of the decoding issue.
        message: String,
    },

    /// The plan is not valid JSON.
    #[error("Plan is not valid JSON: {message}")]
    InvalidJson {
        /// Description of the JSON error.
        message: String,
    },

    /// The plan is valid JSON but not shaped like a Terraform plan.
    #[error("Plan has an unexpected shape: {message}")]
    Malformed {
        /// Description of the shape issue.
        message: String,
    },
}

/// Azure Resource Manager errors.
#[derive(Debug, Error)]
pub enum AzureError {
    /// No access token could be obtained.
    #[error("Azure credentials unavailable: {message}")]
    CredentialUnavailable {
        /// Description of the credential issue.
        message: String,
    },

    /// Authentication failed.
    #[error("Azure authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("Azure API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from API.
        message: String,
    },

    /// Rate limited.
    #[error("Azure API rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("Network error communicating with Azure: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from API.
    #[error("Invalid response from Azure API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Command execution errors.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The shell could not be started.
    #[error("Failed to spawn `{command}`: {message}")]
    SpawnFailed {
        /// Command line that was being run.
        command: String,
        /// Underlying IO error message.
        message: String,
    },
}

/// Result type alias for tfimport operations.
pub type Result<T> = std::result::Result<T, TfImportError>;

impl TfImportError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Azure(AzureError::RateLimited { .. } | AzureError::NetworkError { .. }) => true,
            Self::Azure(AzureError::ApiRequestFailed { status, .. }) => *status >= 500,
            _ => false,
        }
    }

    /// Returns the suggested retry delay in seconds, if applicable.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::Azure(AzureError::RateLimited { retry_after_secs }) => Some(*retry_after_secs),
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a missing setting error.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingSetting { name: name.into() }
    }
}

impl PlanError {
    /// Creates a malformed plan error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl AzureError {
    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }
}
