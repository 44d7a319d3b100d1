//! lambda-cost - Lambda spend and right-sizing report
//!
//! Reads the last day of `REPORT` lines for every function in a region,
//! prices them, and suggests a smaller memory size on arm64.
//!
//! ## Usage
//!
//! ```bash
//! # Region from the AWS profile / environment
//! lambda-cost
//!
//! # Explicit region
//! lambda-cost --region eu-west-1
//! ```
//!
//! Collected data is cached as `{account}-{region}.json`; delete it to
//! download fresh logs.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lambda_cost_collector::{
    AwsLogSource, Collector, TracingDiagnostics, collect_or_load, load_config, resolve_account_id,
};
use lambda_cost_core::{LambdaCostError, Settings, init_logging};
use lambda_cost_model::{CostModel, SnapshotKey, SnapshotStore, render_report};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Estimate Lambda costs from CloudWatch logs and recommend memory sizes.
#[derive(Parser, Debug)]
#[command(name = "lambda-cost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The AWS region to query
    #[arg(long)]
    region: Option<String>,
}

enum Outcome {
    Reported,
    Cancelled,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(None) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(cli).await {
        Ok(Outcome::Reported) => ExitCode::SUCCESS,
        Ok(Outcome::Cancelled) => {
            println!();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "lambda-cost failed");
            eprintln!("Error: {e:#}");
            if let Some(hint) = e
                .downcast_ref::<LambdaCostError>()
                .and_then(LambdaCostError::guidance)
            {
                eprintln!("Hint: {hint}");
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let settings = Settings::load_default().context("could not load settings")?;

    let config = load_config(cli.region.as_deref())
        .await
        .context("could not load AWS config")?;
    let region = config
        .region()
        .map(ToString::to_string)
        .ok_or(LambdaCostError::RegionMissing)?;

    info!(region = %region, "looking up account ID");
    let account_id = resolve_account_id(&config)
        .await
        .context("could not get current identity, are you logged in?")?;
    info!(region = %region, account = %account_id, "resolved account");

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let store = SnapshotStore::new(settings.snapshot_dir());
    let key = SnapshotKey::new(account_id, region);
    let collector = Collector::new(
        AwsLogSource::new(&config),
        Arc::new(TracingDiagnostics),
        settings.collection.clone(),
    );
    let window = collector.default_window();

    let aggregates = match collect_or_load(&store, &key, &collector, &window, &cancel).await {
        Ok(aggregates) => aggregates,
        Err(e) if e.is_cancelled() => {
            warn!("interrupted, no report data saved");
            return Ok(Outcome::Cancelled);
        }
        Err(e) => return Err(e).context("failed to get function reports"),
    };

    let model = CostModel::from_settings(&settings);
    render_report(&aggregates, &model, std::io::stdout().lock())
        .context("could not write report")?;

    Ok(Outcome::Reported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_region_flag() {
        let cli = Cli::try_parse_from(["lambda-cost", "--region", "eu-west-1"]).unwrap();
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));

        let cli = Cli::try_parse_from(["lambda-cost"]).unwrap();
        assert_eq!(cli.region, None);
    }

    #[test]
    fn test_no_other_flags() {
        assert!(Cli::try_parse_from(["lambda-cost", "--verbose"]).is_err());
    }
}
