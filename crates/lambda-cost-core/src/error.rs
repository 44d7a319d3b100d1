//! Error types for lambda-cost setup and I/O.
//!
//! [`LambdaCostError`] covers everything that can go wrong before or around
//! the cost model itself: settings files, log directories, and AWS region
//! and account resolution. All of these are fatal for a run; the binary logs
//! the error and exits.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`LambdaCostError`].
pub type Result<T> = std::result::Result<T, LambdaCostError>;

/// Setup and I/O errors for a lambda-cost run.
#[derive(Debug, Error)]
pub enum LambdaCostError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Settings file could not be read
    #[error("Failed to read settings at {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is invalid YAML
    #[error("Invalid settings at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Settings parsed but failed validation
    #[error("Settings validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // AWS Setup Errors
    // =========================================================================
    /// No region could be resolved from the flag or the provider chain
    #[error("No AWS region configured")]
    RegionMissing,

    /// The caller identity lookup failed
    #[error("Could not look up AWS account: {message}")]
    AccountLookup { message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in lambda-cost)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LambdaCostError {
    /// Create an account lookup error
    pub fn account_lookup(message: impl Into<String>) -> Self {
        Self::AccountLookup {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::RegionMissing => Some("Pass --region or set AWS_REGION"),
            Self::AccountLookup { .. } => {
                Some("Check that you are logged in, e.g. 'aws sts get-caller-identity'")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in ~/.lambda-cost/config.yaml"),
            _ => None,
        }
    }
}
