//! # lambda-cost-collector
//!
//! Gathers a day of Lambda `REPORT` lines for every function in a region.
//!
//! This crate provides:
//! - [`LogSource`] - The seam between collection and the AWS APIs
//! - [`AwsLogSource`] - Lambda `ListFunctions` + CloudWatch Logs `FilterLogEvents`
//! - [`Collector`] - Pages through logs and builds [`FunctionAggregate`](lambda_cost_model::FunctionAggregate)s
//! - [`Diagnostics`] - Where skipped lines and failed pages are reported
//! - [`collect_or_load`] - Reuse a snapshot when one exists

pub mod aws;
pub mod collector;
pub mod diagnostics;
pub mod error;
pub mod source;

pub use aws::{AwsLogSource, load_config, resolve_account_id};
pub use collector::{Collector, collect_or_load};
pub use diagnostics::{DiagnosticEvent, Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use error::{CollectError, Result};
pub use source::{CollectionWindow, FunctionDescriptor, LogPage, LogSource};
