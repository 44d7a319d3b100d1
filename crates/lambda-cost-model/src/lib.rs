//! # lambda-cost-model
//!
//! Turns Lambda `REPORT` log lines into per-function cost figures and
//! memory recommendations.
//!
//! This crate provides:
//! - [`ReportParser`] - Parse one log line into a [`Measurement`]
//! - [`FunctionAggregate`] - Measurements for one function plus summary statistics
//! - [`CostModel`] - Flat-rate pricing, monthly projection and right-sizing
//! - [`render_report`] - The plain-text report table
//! - [`SnapshotStore`] - `{account}-{region}.json` snapshots
//!
//! ## Example
//!
//! ```
//! use lambda_cost_model::{FunctionAggregate, ReportParser};
//!
//! let parser = ReportParser::new();
//! let line = "REPORT RequestId: d432\tDuration: 27.83 ms\tBilled Duration: 28 ms\tMemory Size: 3072 MB\tMax Memory Used: 62 MB";
//!
//! let mut aggregate = FunctionAggregate::new("orders", "x86_64");
//! if let Some(measurement) = parser.parse(line).unwrap() {
//!     aggregate.push(measurement);
//! }
//!
//! let recommendation = aggregate.optimize();
//! assert_eq!(recommendation.memory_mb, 1024);
//! assert!(recommendation.cost < aggregate.current_cost());
//! ```

pub mod cost;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod parser;
pub mod report;
pub mod snapshot;

pub use cost::{ARM64, CostModel, FunctionMetrics, monthly_projection, monthly_savings};
pub use error::{CostError, Result};
pub use models::{FunctionAggregate, Measurement};
pub use optimizer::Recommendation;
pub use parser::{ParsedBatch, REPORT_MARKER, ReportParser};
pub use report::{NO_RECOMMENDATION, ranked_metrics, render_report};
pub use snapshot::{SnapshotKey, SnapshotStore};
