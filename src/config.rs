//! Engine Configuration
//!
//! The numeric constants of the discovery pipeline plus the worker count.
//! Defaults are the reference constants; a JSON file may override any subset
//! of fields, missing ones fall back to their defaults.

use crate::error::{CausalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Zero-lag correlation above which two events of one series are merged.
pub const MERGE_THRESHOLD: f64 = 0.80;
/// Squared residuals at or below this value are treated as numerical noise.
pub const SSR_EPSILON: f64 = 1e-20;
/// Autoregressive order `p` of every regression.
pub const LAG_ORDER: usize = 5;
/// Dead-time search window (exclusive upper bound).
pub const MAX_LAG: usize = 30;
/// Significance level of both F-tests.
pub const SIGNIFICANCE: f64 = 0.05;

/// Numeric parameters of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CausalParams {
    pub merge_threshold: f64,
    pub ssr_epsilon: f64,
    pub lag_order: usize,
    pub max_lag: usize,
    pub significance: f64,
}

impl Default for CausalParams {
    fn default() -> Self {
        Self {
            merge_threshold: MERGE_THRESHOLD,
            ssr_epsilon: SSR_EPSILON,
            lag_order: LAG_ORDER,
            max_lag: MAX_LAG,
            significance: SIGNIFICANCE,
        }
    }
}

impl CausalParams {
    pub fn validate(&self) -> Result<()> {
        if !self.merge_threshold.is_finite()
            || self.merge_threshold <= -1.0
            || self.merge_threshold > 1.0
        {
            return Err(invalid(
                "merge_threshold",
                format!("{} is not in (-1, 1]", self.merge_threshold),
            ));
        }
        if !self.ssr_epsilon.is_finite() || self.ssr_epsilon < 0.0 {
            return Err(invalid(
                "ssr_epsilon",
                format!("{} must be finite and non-negative", self.ssr_epsilon),
            ));
        }
        if self.lag_order == 0 {
            return Err(invalid("lag_order", "must be at least 1".to_string()));
        }
        if self.max_lag == 0 {
            return Err(invalid("max_lag", "must be at least 1".to_string()));
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(invalid(
                "significance",
                format!("{} is not in (0, 1)", self.significance),
            ));
        }
        Ok(())
    }
}

/// Full engine configuration as read from disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub params: CausalParams,
    /// Worker threads for pairwise work. 0 = available parallelism.
    pub workers: usize,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()
    }

    /// Resolves `workers = 0` to the machine's parallelism.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

fn invalid(name: &'static str, reason: String) -> CausalError {
    CausalError::InvalidParameter { name, reason }
}
