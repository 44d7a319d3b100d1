//! Reporting of skipped lines, failed pages and progress.
//!
//! The collector never logs directly; it is handed a [`Diagnostics`] so tests
//! can observe exactly what was skipped without installing a subscriber.

use crate::error::CollectError;
use lambda_cost_model::CostError;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Sink for collection events that do not stop the run.
pub trait Diagnostics: Send + Sync {
    /// A report line had a malformed field and was dropped.
    fn skipped_line(&self, function: &str, line: &str, error: &CostError);

    /// A page fetch failed; the function keeps what was collected so far.
    fn page_failed(&self, function: &str, error: &CollectError);

    /// Running totals, emitted periodically.
    fn progress(&self, log_events: usize, invocations: usize);

    /// More than one memory size was seen for a function.
    fn memory_drift(&self, function: &str, sizes: &[u64]);
}

/// Emits every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn skipped_line(&self, function: &str, line: &str, error: &CostError) {
        error!(function_name = function, log_message = line, error = %error, "failed to get report");
    }

    fn page_failed(&self, function: &str, error: &CollectError) {
        error!(function_name = function, error = %error, "failed to get next page");
    }

    fn progress(&self, log_events: usize, invocations: usize) {
        info!(log_event_count = log_events, invocation_count = invocations, "working");
    }

    fn memory_drift(&self, function: &str, sizes: &[u64]) {
        warn!(
            function_name = function,
            memory_sizes = ?sizes,
            "memory size changed during the window, costing with the first one seen"
        );
    }
}

/// A diagnostic event captured by [`RecordingDiagnostics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    SkippedLine { function: String, line: String, error: String },
    PageFailed { function: String, error: String },
    Progress { log_events: usize, invocations: usize },
    MemoryDrift { function: String, sizes: Vec<u64> },
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.lock().clone()
    }

    fn record(&self, event: DiagnosticEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DiagnosticEvent>> {
        // A panic while holding the lock leaves the Vec intact.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn skipped_line(&self, function: &str, line: &str, error: &CostError) {
        self.record(DiagnosticEvent::SkippedLine {
            function: function.to_string(),
            line: line.to_string(),
            error: error.to_string(),
        });
    }

    fn page_failed(&self, function: &str, error: &CollectError) {
        self.record(DiagnosticEvent::PageFailed {
            function: function.to_string(),
            error: error.to_string(),
        });
    }

    fn progress(&self, log_events: usize, invocations: usize) {
        self.record(DiagnosticEvent::Progress {
            log_events,
            invocations,
        });
    }

    fn memory_drift(&self, function: &str, sizes: &[u64]) {
        self.record(DiagnosticEvent::MemoryDrift {
            function: function.to_string(),
            sizes: sizes.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_diagnostics() {
        let diagnostics = RecordingDiagnostics::new();
        diagnostics.skipped_line("orders", "REPORT Duration: x ms", &CostError::malformed("Duration", "x"));
        diagnostics.progress(10_000, 12);

        assert_eq!(
            diagnostics.events(),
            vec![
                DiagnosticEvent::SkippedLine {
                    function: "orders".into(),
                    line: "REPORT Duration: x ms".into(),
                    error: "could not parse Duration: \"x\"".into(),
                },
                DiagnosticEvent::Progress {
                    log_events: 10_000,
                    invocations: 12,
                },
            ]
        );
    }

    #[test]
    fn test_tracing_diagnostics_does_not_panic() {
        lambda_cost_core::logging::init_test_logging();
        let diagnostics = TracingDiagnostics;
        diagnostics.page_failed("orders", &CollectError::page("orders", "timeout"));
        diagnostics.memory_drift("orders", &[512, 1024]);
    }
}
