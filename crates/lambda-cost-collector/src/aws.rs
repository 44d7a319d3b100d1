//! AWS-backed [`LogSource`] and account lookup.
//!
//! Functions come from Lambda `ListFunctions`; log lines come from
//! CloudWatch Logs `FilterLogEvents` on `/aws/lambda/{name}`.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_cloudwatchlogs as cloudwatchlogs;
use aws_sdk_lambda as lambda;
use aws_sdk_sts as sts;
use lambda_cost_core::LambdaCostError;
use tracing::debug;

use crate::error::{CollectError, Result};
use crate::source::{CollectionWindow, FunctionDescriptor, LogPage, LogSource};

/// Log group Lambda writes to for a function.
pub fn log_group_name(function: &str) -> String {
    format!("/aws/lambda/{function}")
}

/// Load the default AWS configuration, overriding the region when one is given.
pub async fn load_config(region: Option<&str>) -> lambda_cost_core::Result<SdkConfig> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region.filter(|r| !r.is_empty()) {
        loader = loader.region(Region::new(region.to_string()));
    }
    let config = loader.load().await;

    if config.region().is_none() {
        return Err(LambdaCostError::RegionMissing);
    }
    Ok(config)
}

/// Account ID of the current credentials.
pub async fn resolve_account_id(config: &SdkConfig) -> lambda_cost_core::Result<String> {
    let identity = sts::Client::new(config)
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| LambdaCostError::account_lookup(sts::error::DisplayErrorContext(&e).to_string()))?;

    identity
        .account()
        .map(str::to_string)
        .ok_or_else(|| LambdaCostError::account_lookup("caller identity has no account"))
}

/// Reads functions and logs from one AWS region.
#[derive(Debug, Clone)]
pub struct AwsLogSource {
    lambda: lambda::Client,
    logs: cloudwatchlogs::Client,
}

impl AwsLogSource {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            lambda: lambda::Client::new(config),
            logs: cloudwatchlogs::Client::new(config),
        }
    }
}

#[async_trait]
impl LogSource for AwsLogSource {
    async fn list_functions(&self) -> Result<Vec<FunctionDescriptor>> {
        let mut functions = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self
                .lambda
                .list_functions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| {
                    CollectError::list_functions(lambda::error::DisplayErrorContext(&e).to_string())
                })?;

            for function in page.functions() {
                let Some(name) = function.function_name() else {
                    continue;
                };
                functions.push(FunctionDescriptor {
                    name: name.to_string(),
                    architectures: function
                        .architectures()
                        .iter()
                        .map(|a| a.as_str().to_string())
                        .collect(),
                });
            }

            match page.next_marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }

        debug!(count = functions.len(), "listed functions");
        Ok(functions)
    }

    async fn fetch_page(
        &self,
        function: &str,
        window: &CollectionWindow,
        next_token: Option<String>,
    ) -> Result<LogPage> {
        let output = self
            .logs
            .filter_log_events()
            .log_group_name(log_group_name(function))
            .start_time(window.start_ms)
            .end_time(window.end_ms)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                CollectError::page(
                    function,
                    cloudwatchlogs::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(LogPage {
            messages: output
                .events()
                .iter()
                .filter_map(|event| event.message())
                .map(str::to_string)
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }
}
