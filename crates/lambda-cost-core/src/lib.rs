//! # lambda-cost-core
//!
//! Shared plumbing for lambda-cost.
//!
//! This crate provides:
//! - [`LambdaCostError`] - Setup and I/O errors that end a run
//! - [`logging`] - Tracing setup
//! - [`settings`] - Optional YAML settings with pricing and optimizer defaults

pub mod error;
pub mod logging;
pub mod settings;

pub use error::{LambdaCostError, Result};
pub use logging::{LogGuard, init_logging};
pub use settings::{CollectionSettings, OptimizerSettings, PricingSettings, ReportSettings, Settings};
