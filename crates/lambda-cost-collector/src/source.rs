//! Where log lines come from.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// A function discovered in the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Architecture labels, e.g. `["arm64"]`
    pub architectures: Vec<String>,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, architectures: &[&str]) -> Self {
        Self {
            name: name.into(),
            architectures: architectures.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Labels joined by a single space.
    pub fn architecture_label(&self) -> String {
        self.architectures.join(" ")
    }
}

/// One page of raw log messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub messages: Vec<String>,
    /// Token for the following page, `None` on the last page
    pub next_token: Option<String>,
}

/// Observation window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl CollectionWindow {
    /// The `hours` leading up to `end`.
    pub fn ending_at(end: DateTime<Utc>, hours: u32) -> Self {
        let start = end - Duration::hours(i64::from(hours));
        Self {
            start_ms: start.timestamp_millis(),
            end_ms: end.timestamp_millis(),
        }
    }

    /// The `hours` leading up to now.
    pub fn last_hours(hours: u32) -> Self {
        Self::ending_at(Utc::now(), hours)
    }
}

/// Lists functions and pages through their logs.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Every function in the region. Failure here ends the run.
    async fn list_functions(&self) -> Result<Vec<FunctionDescriptor>>;

    /// One page of log messages for `function` within `window`.
    async fn fetch_page(
        &self,
        function: &str,
        window: &CollectionWindow,
        next_token: Option<String>,
    ) -> Result<LogPage>;
}
