//! Logging infrastructure for lambda-cost.
//!
//! Structured logging uses the `tracing` ecosystem:
//!
//! - Human-readable output on stderr, so stdout stays reserved for the report table
//! - JSON lines in `~/.lambda-cost/logs/lambda-cost.log` (daily rotation)
//! - `RUST_LOG` overrides the default `lambda_cost=info` filter
//!
//! ## Example
//!
//! ```no_run
//! use lambda_cost_core::logging;
//!
//! let _guard = logging::init_logging(None).expect("logging init");
//! tracing::info!(region = "eu-west-1", "looking up account ID");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{LambdaCostError, Result};

/// Guard that must be held to ensure log flushing on shutdown.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize logging for the CLI.
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.lambda-cost/logs/`
///
/// # Returns
///
/// A [`LogGuard`] that must be held for the application lifetime.
pub fn init_logging(log_dir: Option<PathBuf>) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| LambdaCostError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "lambda-cost.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lambda_cost=info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_current_span(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Home directory used for logs and the settings file.
///
/// Returns `~/.lambda-cost/`
pub fn app_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| LambdaCostError::internal("HOME environment variable not set"))?;

    Ok(PathBuf::from(home).join(".lambda-cost"))
}

/// Get the default log directory path.
///
/// Returns `~/.lambda-cost/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(app_dir()?.join("logs"))
}
