//! Lambda cost model.
//!
//! Pricing is flat and single-tier: the provider's volume discounts for
//! billions of GB-seconds per month are not modelled. For one function over
//! the observed window:
//!
//! ```text
//! requests    = 0.20 / 1_000_000 * invocations
//! gb_seconds  = memory_mb / 1024 * billed_seconds
//! total       = gb_seconds * rate(architecture) + requests
//! ```

use crate::models::FunctionAggregate;
use lambda_cost_core::{OptimizerSettings, PricingSettings, Settings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Architecture label priced at the Graviton rate.
pub const ARM64: &str = "arm64";

const MB_PER_GB: f64 = 1024.0;
const REQUESTS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// Pricing and optimizer settings bundled for costing aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub pricing: PricingSettings,
    pub optimizer: OptimizerSettings,
    pub days_per_month: u32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CostModel {
    pub fn new(pricing: PricingSettings, optimizer: OptimizerSettings, days_per_month: u32) -> Self {
        Self {
            pricing,
            optimizer,
            days_per_month,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.pricing.clone(),
            settings.optimizer.clone(),
            settings.report.days_per_month,
        )
    }

    /// GB-second rate for an architecture label. Anything other than exactly
    /// `arm64` is billed at the x86_64 rate.
    pub fn rate_for(&self, architecture: &str) -> f64 {
        if architecture == ARM64 {
            self.pricing.arm_price_per_gb_second
        } else {
            self.pricing.x86_price_per_gb_second
        }
    }

    /// Cost of the observed window under the function's own configuration.
    pub fn current_cost(&self, aggregate: &FunctionAggregate) -> f64 {
        self.cost_for(aggregate, &aggregate.architecture, 0)
    }

    /// Cost of the observed window with the architecture replaced and,
    /// unless `memory_override_mb` is 0, the memory size forced.
    ///
    /// With no override the whole window is charged at the first non-zero
    /// recorded memory size.
    pub fn cost_for(
        &self,
        aggregate: &FunctionAggregate,
        architecture: &str,
        memory_override_mb: u64,
    ) -> f64 {
        if aggregate.measurements.is_empty() {
            return 0.0;
        }

        let request_cost = self.pricing.request_price_per_million / REQUESTS_PER_PRICE_UNIT
            * aggregate.measurements.len() as f64;

        let memory_mb = if memory_override_mb == 0 {
            aggregate.billed_memory()
        } else {
            memory_override_mb
        };
        let gb_seconds = gb_seconds(memory_mb, aggregate.total_billed_duration());

        gb_seconds * self.rate_for(architecture) + request_cost
    }

    /// Scale a cost over the observed day to a month.
    pub fn monthly(&self, daily_cost: f64) -> f64 {
        monthly_projection(daily_cost, self.days_per_month)
    }

    /// Everything the report shows for one function.
    pub fn metrics(&self, aggregate: &FunctionAggregate) -> FunctionMetrics {
        let daily_cost = self.current_cost(aggregate);
        let monthly_cost = self.monthly(daily_cost);
        let recommendation = self.optimize(aggregate);
        let optimized_monthly_cost = self.monthly(recommendation.cost);

        let assigned = aggregate.assigned_memory();
        let peak = aggregate.peak_memory_used();
        let peak_memory_pct = if assigned > 0 {
            peak as f64 / assigned as f64 * 100.0
        } else {
            0.0
        };

        FunctionMetrics {
            name: aggregate.name.clone(),
            architecture: aggregate.architecture.clone(),
            daily_cost,
            monthly_cost,
            invocations: aggregate.invocation_count(),
            average_duration: aggregate.average_duration(),
            peak_memory_mb: peak,
            peak_memory_pct,
            assigned_memory_mb: assigned,
            proposed_memory_mb: recommendation
                .is_available()
                .then_some(recommendation.memory_mb),
            optimized_monthly_cost,
            monthly_savings: monthly_savings(monthly_cost, optimized_monthly_cost),
        }
    }
}

fn gb_seconds(memory_mb: u64, billed: Duration) -> f64 {
    memory_mb as f64 / MB_PER_GB * billed.as_secs_f64()
}

/// Daily cost multiplied out to a month.
pub fn monthly_projection(daily_cost: f64, days_per_month: u32) -> f64 {
    daily_cost * f64::from(days_per_month)
}

/// Savings from moving to the optimized configuration, never negative.
pub fn monthly_savings(current_monthly: f64, optimized_monthly: f64) -> f64 {
    (current_monthly - optimized_monthly).max(0.0)
}

/// Derived figures for one function. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMetrics {
    pub name: String,
    pub architecture: String,
    pub daily_cost: f64,
    pub monthly_cost: f64,
    pub invocations: usize,
    pub average_duration: Duration,
    pub peak_memory_mb: u64,
    /// Peak memory as a percentage of assigned memory (0 when unknown)
    pub peak_memory_pct: f64,
    pub assigned_memory_mb: u64,
    /// `None` when there is nothing to recommend
    pub proposed_memory_mb: Option<u64>,
    pub optimized_monthly_cost: f64,
    pub monthly_savings: f64,
}

impl FunctionAggregate {
    /// Cost under the function's own architecture and memory, default pricing.
    pub fn current_cost(&self) -> f64 {
        CostModel::default().current_cost(self)
    }

    /// Cost with a substituted architecture and optional memory size
    /// (0 keeps each measurement's own size), default pricing.
    pub fn cost_for_hypothetical(&self, architecture: &str, memory_override_mb: u64) -> f64 {
        CostModel::default().cost_for(self, architecture, memory_override_mb)
    }
}
