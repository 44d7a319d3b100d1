//! Turns a [`LogSource`] into per-function aggregates.

use std::sync::Arc;

use lambda_cost_core::CollectionSettings;
use lambda_cost_model::{FunctionAggregate, ReportParser, SnapshotKey, SnapshotStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::diagnostics::Diagnostics;
use crate::error::{CollectError, Result};
use crate::source::{CollectionWindow, LogSource};

/// Running totals across all functions.
#[derive(Debug)]
struct Progress {
    interval: usize,
    log_events: usize,
    invocations: usize,
}

impl Progress {
    fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            log_events: 0,
            invocations: 0,
        }
    }

    /// Add a page's counts; true when an interval boundary was crossed.
    fn record(&mut self, log_events: usize, invocations: usize) -> bool {
        let before = self.log_events / self.interval;
        self.log_events += log_events;
        self.invocations += invocations;
        self.log_events / self.interval > before
    }
}

/// Collects REPORT measurements for every function a source knows about.
pub struct Collector<S> {
    source: S,
    diagnostics: Arc<dyn Diagnostics>,
    parser: ReportParser,
    settings: CollectionSettings,
}

impl<S: LogSource> Collector<S> {
    pub fn new(source: S, diagnostics: Arc<dyn Diagnostics>, settings: CollectionSettings) -> Self {
        Self {
            source,
            diagnostics,
            parser: ReportParser::new(),
            settings,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Window of `settings.window_hours` ending now.
    pub fn default_window(&self) -> CollectionWindow {
        CollectionWindow::last_hours(self.settings.window_hours)
    }

    /// Collect every function's measurements within `window`.
    ///
    /// Bad lines and failed pages are reported and skipped. Listing failures
    /// and cancellation end the whole collection.
    pub async fn collect(
        &self,
        window: &CollectionWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<FunctionAggregate>> {
        info!("listing functions");
        let functions = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CollectError::Cancelled),
            functions = self.source.list_functions() => functions?,
        };
        info!(function_count = functions.len(), "found functions");

        let mut aggregates: Vec<FunctionAggregate> = functions
            .iter()
            .map(|f| FunctionAggregate::new(&f.name, f.architecture_label()))
            .collect();

        let mut progress = Progress::new(self.settings.progress_interval);
        for (index, aggregate) in aggregates.iter_mut().enumerate() {
            info!(function_name = %aggregate.name, function_index = index, "downloading logs");
            self.collect_function(aggregate, window, cancel, &mut progress)
                .await?;

            let sizes = aggregate.distinct_memory_sizes();
            if sizes.len() > 1 {
                let sizes: Vec<u64> = sizes.into_iter().collect();
                self.diagnostics.memory_drift(&aggregate.name, &sizes);
            }
        }

        info!(
            log_event_count = progress.log_events,
            invocation_count = progress.invocations,
            "downloading log data complete"
        );
        Ok(aggregates)
    }

    async fn collect_function(
        &self,
        aggregate: &mut FunctionAggregate,
        window: &CollectionWindow,
        cancel: &CancellationToken,
        progress: &mut Progress,
    ) -> Result<()> {
        let mut next_token = None;
        loop {
            let page = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CollectError::Cancelled),
                page = self.source.fetch_page(&aggregate.name, window, next_token.take()) => page,
            };

            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    // Keep the partial sample and move on to the next function.
                    self.diagnostics.page_failed(&aggregate.name, &e);
                    return Ok(());
                }
            };

            let batch = self
                .parser
                .parse_lines(page.messages.iter().map(String::as_str));
            for failure in &batch.failures {
                self.diagnostics.skipped_line(
                    &aggregate.name,
                    &page.messages[failure.index],
                    &failure.error,
                );
            }

            let accepted = batch.measurements.len();
            for measurement in batch.measurements {
                aggregate.push(measurement);
            }
            debug!(
                function_name = %aggregate.name,
                messages = page.messages.len(),
                accepted,
                "processed page"
            );

            if progress.record(page.messages.len(), accepted) {
                self.diagnostics
                    .progress(progress.log_events, progress.invocations);
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(()),
            }
        }
    }
}

/// Reuse the snapshot for `key` if there is one, otherwise collect and save.
pub async fn collect_or_load<S: LogSource>(
    store: &SnapshotStore,
    key: &SnapshotKey,
    collector: &Collector<S>,
    window: &CollectionWindow,
    cancel: &CancellationToken,
) -> Result<Vec<FunctionAggregate>> {
    if let Some(aggregates) = store.load(key)? {
        return Ok(aggregates);
    }

    info!("no existing report data found, downloading logs from AWS");
    let aggregates = collector.collect(window, cancel).await?;

    info!("creating report JSON file");
    let path = store.save(key, &aggregates)?;
    info!(filename = %path.display(), "downloading logs complete");

    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_crossing() {
        let mut progress = Progress::new(10_000);
        assert!(!progress.record(9_999, 10));
        assert!(progress.record(1, 0));
        assert!(!progress.record(5_000, 0));
        assert!(progress.record(25_000, 3));
        assert_eq!(progress.log_events, 40_000);
        assert_eq!(progress.invocations, 13);
    }

    #[test]
    fn test_progress_zero_interval() {
        let mut progress = Progress::new(0);
        assert!(progress.record(1, 1));
    }
}
