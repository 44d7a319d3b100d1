//! Memory right-sizing.
//!
//! For a function above the memory floor the proposal is twice the peak
//! observed memory, lifted to just above the floor, rounded down to the
//! 256 MB billing step, and only taken if it is smaller than what is
//! configured today. Every proposal is priced on arm64.

use crate::cost::CostModel;
use crate::models::FunctionAggregate;
use serde::{Deserialize, Serialize};

/// Proposed memory size and its cost over the observed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Proposed memory in MB; 0 means no recommendation is available
    pub memory_mb: u64,

    /// Cost of the observed window at `memory_mb` on the target architecture
    pub cost: f64,
}

impl Recommendation {
    /// No data, nothing to recommend.
    pub const NONE: Self = Self {
        memory_mb: 0,
        cost: 0.0,
    };

    pub fn is_available(&self) -> bool {
        self.memory_mb > 0
    }
}

impl CostModel {
    /// Memory size the optimizer would pick, before pricing.
    ///
    /// Sizes at or below the floor are returned unchanged.
    pub fn proposed_memory(&self, assigned_mb: u64, peak_used_mb: u64) -> u64 {
        let floor = self.optimizer.memory_floor_mb;
        if assigned_mb <= floor {
            return assigned_mb;
        }

        let step = self.optimizer.rounding_step_mb.max(1);
        let candidate = peak_used_mb
            .saturating_mul(self.optimizer.headroom_factor)
            .max(floor + 1);
        let candidate = candidate / step * step;

        if candidate < assigned_mb {
            candidate
        } else {
            assigned_mb
        }
    }

    /// Right-size the function and price it on the target architecture.
    pub fn optimize(&self, aggregate: &FunctionAggregate) -> Recommendation {
        if aggregate.measurements.is_empty() {
            return Recommendation::NONE;
        }

        let memory_mb =
            self.proposed_memory(aggregate.assigned_memory(), aggregate.peak_memory_used());
        let cost = self.cost_for(aggregate, &self.optimizer.target_architecture, memory_mb);

        Recommendation { memory_mb, cost }
    }
}

impl FunctionAggregate {
    /// Recommended memory and its arm64 cost, default settings.
    pub fn optimize(&self) -> Recommendation {
        CostModel::default().optimize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::ARM64;
    use crate::models::Measurement;
    use lambda_cost_core::OptimizerSettings;
    use std::time::Duration;

    fn aggregate(architecture: &str, memory: u64, peaks: &[u64]) -> FunctionAggregate {
        let mut agg = FunctionAggregate::new("fn", architecture);
        for &peak in peaks {
            let d = Duration::from_millis(250);
            agg.push(Measurement::new(d, d, memory, peak));
        }
        agg
    }

    #[test]
    fn test_empty_has_no_recommendation() {
        let rec = FunctionAggregate::new("idle", "x86_64").optimize();
        assert_eq!(rec, Recommendation::NONE);
        assert!(!rec.is_available());
    }

    #[test]
    fn test_small_peak_lifted_to_floor() {
        let agg = aggregate("x86_64", 3072, &[64, 12]);
        let rec = agg.optimize();

        assert_eq!(rec.memory_mb, 1024);
        assert_eq!(
            rec.cost.to_bits(),
            agg.cost_for_hypothetical(ARM64, 1024).to_bits()
        );
    }

    #[test]
    fn test_at_floor_only_switches_architecture() {
        let agg = aggregate("x86_64", 1024, &[900]);
        let rec = agg.optimize();

        assert_eq!(rec.memory_mb, 1024);
        assert_eq!(rec.cost.to_bits(), agg.cost_for_hypothetical(ARM64, 1024).to_bits());
        assert!(rec.cost < agg.current_cost());
    }

    #[test]
    fn test_below_floor_unchanged() {
        let rec = aggregate("arm64", 128, &[120]).optimize();
        assert_eq!(rec.memory_mb, 128);
    }

    #[test]
    fn test_rounds_down_to_step() {
        // 2 * 700 = 1400 -> 1280
        let rec = aggregate("x86_64", 4096, &[700]).optimize();
        assert_eq!(rec.memory_mb, 1280);
    }

    #[test]
    fn test_never_proposes_increase() {
        // 2 * 1800 = 3600 -> 3584, which is above the configured 2048
        let rec = aggregate("x86_64", 2048, &[1800]).optimize();
        assert_eq!(rec.memory_mb, 2048);
    }

    #[test]
    fn test_equal_candidate_keeps_current() {
        // 2 * 1024 = 2048 == assigned
        let rec = aggregate("x86_64", 2048, &[1024]).optimize();
        assert_eq!(rec.memory_mb, 2048);
    }

    #[test]
    fn test_odd_configured_size() {
        // Lambda allows any MB value; 3096 is not a 256 multiple.
        let rec = aggregate("x86_64", 3096, &[62, 55]).optimize();
        assert_eq!(rec.memory_mb, 1024);
    }

    #[test]
    fn test_idempotent() {
        let agg = aggregate("x86_64", 3008, &[400, 610, 20]);
        let a = agg.optimize();
        let b = agg.optimize();
        assert_eq!(a.memory_mb, b.memory_mb);
        assert_eq!(a.cost.to_bits(), b.cost.to_bits());
    }

    #[test]
    fn test_custom_floor() {
        let model = CostModel {
            optimizer: OptimizerSettings {
                memory_floor_mb: 256,
                ..OptimizerSettings::default()
            },
            ..CostModel::default()
        };
        // 2 * 100 = 200 -> 257 -> 256
        assert_eq!(model.proposed_memory(1024, 100), 256);
    }
}
