//! Error types for parsing, costing and snapshots.

use std::path::PathBuf;
use thiserror::Error;

/// Cost model errors.
#[derive(Error, Debug)]
pub enum CostError {
    /// A recognized REPORT field carried a value that is not a valid number
    #[error("could not parse {field}: {value:?}")]
    MalformedField {
        /// Field name as it appears in the log line (e.g. "Billed Duration")
        field: String,
        /// Offending value, without its unit suffix
        value: String,
    },

    /// Snapshot file could not be read or written
    #[error("snapshot I/O error at {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not valid JSON for the expected shape
    #[error("snapshot at {path} is not valid: {source}")]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Report could not be written
    #[error("failed to write report: {0}")]
    Render(#[from] std::io::Error),
}

impl CostError {
    /// Create a malformed field error.
    pub fn malformed(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedField {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for cost model operations.
pub type Result<T> = std::result::Result<T, CostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_field_message() {
        let err = CostError::malformed("Duration", "abc");
        assert_eq!(err.to_string(), "could not parse Duration: \"abc\"");
    }

    #[test]
    fn test_snapshot_io_message() {
        let err = CostError::SnapshotIo {
            path: "1234-us-east-1.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("snapshot I/O error at 1234-us-east-1.json"));
    }
}
