//! Optional YAML settings.
//!
//! Every field defaults to the published on-demand Lambda rates and the
//! optimizer constants, so running without a settings file gives the
//! standard numbers. A file only needs the keys it overrides:
//!
//! ```yaml
//! optimizer:
//!   memory_floor_mb: 512
//! report:
//!   days_per_month: 31
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LambdaCostError, Result};
use crate::logging::app_dir;

/// Environment variable pointing at an explicit settings file.
pub const CONFIG_ENV_VAR: &str = "LAMBDA_COST_CONFIG";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub pricing: PricingSettings,
    pub optimizer: OptimizerSettings,
    pub collection: CollectionSettings,
    pub report: ReportSettings,

    /// Directory holding `{account}-{region}.json` snapshots (defaults to the working directory)
    pub snapshot_dir: Option<PathBuf>,
}

/// Flat, single-tier Lambda pricing in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Price per one million requests
    pub request_price_per_million: f64,

    /// Price per GB-second on x86_64
    pub x86_price_per_gb_second: f64,

    /// Price per GB-second on arm64
    pub arm_price_per_gb_second: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            request_price_per_million: 0.20,
            x86_price_per_gb_second: 0.000_016_666_7,
            arm_price_per_gb_second: 0.000_013_333_4,
        }
    }
}

/// Memory right-sizing knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Functions at or below this size are never shrunk
    pub memory_floor_mb: u64,

    /// Multiplier applied to peak observed memory
    pub headroom_factor: u64,

    /// Proposals are rounded down to a multiple of this
    pub rounding_step_mb: u64,

    /// Architecture every recommendation is priced for
    pub target_architecture: String,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            memory_floor_mb: 1024,
            headroom_factor: 2,
            rounding_step_mb: 256,
            target_architecture: "arm64".to_string(),
        }
    }
}

/// Log collection knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Size of the observation window ending now
    pub window_hours: u32,

    /// Emit a progress line every this many log events
    pub progress_interval: usize,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            window_hours: 24,
            progress_interval: 10_000,
        }
    }
}

/// Report rendering knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Daily cost is multiplied by this to get a monthly figure
    pub days_per_month: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { days_per_month: 30 }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LambdaCostError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Settings =
            serde_yaml::from_str(&content).map_err(|e| LambdaCostError::ConfigInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        settings.validate()?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load from `$LAMBDA_COST_CONFIG`, then `~/.lambda-cost/config.yaml`,
    /// falling back to defaults when neither exists.
    pub fn load_default() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(path);
        }

        let Ok(dir) = app_dir() else {
            return Ok(Self::default());
        };
        let path = dir.join("config.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that would make the cost model divide by zero or loop.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(LambdaCostError::ConfigValidation {
                message: message.to_string(),
            })
        };

        if self.optimizer.rounding_step_mb == 0 {
            return invalid("optimizer.rounding_step_mb must be greater than 0");
        }
        if self.optimizer.headroom_factor == 0 {
            return invalid("optimizer.headroom_factor must be greater than 0");
        }
        if self.collection.window_hours == 0 {
            return invalid("collection.window_hours must be greater than 0");
        }
        if self.collection.progress_interval == 0 {
            return invalid("collection.progress_interval must be greater than 0");
        }
        if self.report.days_per_month == 0 {
            return invalid("report.days_per_month must be greater than 0");
        }
        let prices = [
            self.pricing.request_price_per_million,
            self.pricing.x86_price_per_gb_second,
            self.pricing.arm_price_per_gb_second,
        ];
        if prices.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return invalid("pricing values must be finite and non-negative");
        }
        Ok(())
    }

    /// Directory for snapshot files.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pricing.request_price_per_million, 0.20);
        assert_eq!(settings.pricing.x86_price_per_gb_second, 0.0000166667);
        assert_eq!(settings.pricing.arm_price_per_gb_second, 0.0000133334);
        assert_eq!(settings.optimizer.memory_floor_mb, 1024);
        assert_eq!(settings.optimizer.rounding_step_mb, 256);
        assert_eq!(settings.collection.window_hours, 24);
        assert_eq!(settings.report.days_per_month, 30);
        assert_eq!(settings.snapshot_dir(), PathBuf::from("."));
        settings.validate().unwrap();
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_yaml("optimizer:\n  memory_floor_mb: 512\nsnapshot_dir: /var/cache\n");
        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.optimizer.memory_floor_mb, 512);
        assert_eq!(settings.optimizer.headroom_factor, 2);
        assert_eq!(settings.pricing, PricingSettings::default());
        assert_eq!(settings.snapshot_dir(), PathBuf::from("/var/cache"));
    }

    #[test]
    fn test_invalid_yaml() {
        let file = write_yaml("optimizer: [not, a, map");
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, LambdaCostError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_zero_rounding_step_rejected() {
        let file = write_yaml("optimizer:\n  rounding_step_mb: 0\n");
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, LambdaCostError::ConfigValidation { .. }));
        assert!(err.to_string().contains("rounding_step_mb"));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load("/nonexistent/lambda-cost.yaml").unwrap_err();
        assert!(matches!(err, LambdaCostError::ConfigRead { .. }));
    }
}
