//! Per-run pipeline configuration.
//!
//! All fields have defaults matching common equity-index usage, so a config can
//! be deserialized from a partial document:
//!
//! ```
//! use ivsurface::PipelineConfig;
//!
//! let cfg: PipelineConfig = serde_json::from_str(r#"{"risk_free_rate": 0.03}"#).unwrap();
//! assert_eq!(cfg.risk_free_rate, 0.03);
//! assert_eq!(cfg.days_max, 180.0);
//! cfg.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{self, IvSurfError};
use crate::implied::SolverConfig;
use crate::smile::ArbitrageFilter;
use crate::validate::{validate_finite, validate_interval};

/// Settings fixed for one pipeline run.
///
/// The IV plausibility band and the convexity threshold are empirical policy
/// parameters, not derived constants; tune them per instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Continuously compounded risk-free rate (decimal).
    pub risk_free_rate: f64,
    /// Smallest days-to-expiry included (inclusive).
    pub days_min: f64,
    /// Largest days-to-expiry included (inclusive).
    pub days_max: f64,
    /// Solved IVs must be strictly above this floor.
    pub iv_floor: f64,
    /// Solved IVs must be strictly below this cap.
    pub iv_cap: f64,
    /// Interior points with a second difference below this value are dropped.
    pub convexity_threshold: f64,
    /// Implied volatility root-finding settings.
    pub solver: SolverConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.045,
            days_min: 7.0,
            days_max: 180.0,
            iv_floor: 0.01,
            iv_cap: 3.0,
            convexity_threshold: ArbitrageFilter::DEFAULT_THRESHOLD,
            solver: SolverConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the risk-free rate.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Set the inclusive days-to-expiry window.
    pub fn with_days_window(mut self, days_min: f64, days_max: f64) -> Self {
        self.days_min = days_min;
        self.days_max = days_max;
        self
    }

    /// Set the exclusive IV plausibility band.
    pub fn with_iv_band(mut self, floor: f64, cap: f64) -> Self {
        self.iv_floor = floor;
        self.iv_cap = cap;
        self
    }

    /// Set the butterfly filter threshold.
    pub fn with_convexity_threshold(mut self, threshold: f64) -> Self {
        self.convexity_threshold = threshold;
        self
    }

    /// Whether `iv` lies strictly inside the plausibility band.
    pub fn is_plausible(&self, iv: f64) -> bool {
        iv > self.iv_floor && iv < self.iv_cap
    }

    /// Check every field is usable.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] for non-finite values, an inverted
    /// days window or IV band, or an invalid solver config.
    pub fn validate(&self) -> error::Result<()> {
        validate_finite(self.risk_free_rate, "risk_free_rate")?;
        validate_finite(self.days_min, "days_min")?;
        validate_finite(self.days_max, "days_max")?;
        if self.days_min > self.days_max {
            return Err(IvSurfError::InvalidInput {
                message: format!(
                    "days_min ({}) must not exceed days_max ({})",
                    self.days_min, self.days_max
                ),
            });
        }
        validate_interval(self.iv_floor, self.iv_cap, "IV plausibility band")?;
        validate_finite(self.convexity_threshold, "convexity_threshold")?;
        self.solver.validate()
    }
}
