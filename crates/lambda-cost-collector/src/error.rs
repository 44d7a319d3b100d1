//! Error types for log collection.

use lambda_cost_model::CostError;
use thiserror::Error;

/// Collection errors.
#[derive(Error, Debug)]
pub enum CollectError {
    /// Listing the region's functions failed; nothing can be collected
    #[error("could not list functions: {message}")]
    ListFunctions { message: String },

    /// One page of log events could not be fetched
    #[error("failed to get next page of logs for {function}: {message}")]
    PageRetrieval { function: String, message: String },

    /// The run was interrupted
    #[error("collection cancelled")]
    Cancelled,

    /// Snapshot could not be loaded or saved
    #[error(transparent)]
    Snapshot(#[from] CostError),
}

impl CollectError {
    pub fn list_functions(message: impl Into<String>) -> Self {
        Self::ListFunctions {
            message: message.into(),
        }
    }

    pub fn page(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PageRetrieval {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error() {
        let err = CollectError::page("orders", "ThrottlingException");
        assert!(!err.is_cancelled());
        assert_eq!(
            err.to_string(),
            "failed to get next page of logs for orders: ThrottlingException"
        );
    }

    #[test]
    fn test_snapshot_error_is_transparent() {
        let err: CollectError = CostError::malformed("Duration", "x").into();
        assert_eq!(err.to_string(), "could not parse Duration: \"x\"");
    }
}
