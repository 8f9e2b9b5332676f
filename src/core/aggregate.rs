//! Activity-driven adaptive aggregation.
//!
//! The deviation of the current buffer decides how much resolution is kept:
//! a quiet signal collapses to its mean, a moderately active one is averaged
//! in groups of four, and a highly active one is passed through untouched.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Samples averaged together at [`ActivityLevel::Medium`].
pub const MEDIUM_GROUP_SIZE: usize = 4;

/// Volatility class of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityLevel::Low => write!(f, "LOW"),
            ActivityLevel::Medium => write!(f, "MEDIUM"),
            ActivityLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Ordered pair of activity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 1000.0,
            high: 5000.0,
        }
    }
}

impl Thresholds {
    /// Build a threshold pair, requiring `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        let thresholds = Self { low, high };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(PipelineError::PreconditionViolation(format!(
                "activity thresholds must satisfy low < high (got {} and {})",
                self.low, self.high
            )));
        }
        Ok(())
    }

    /// Classify a deviation. Values exactly on a threshold resolve upward.
    pub fn classify(&self, std: f64) -> ActivityLevel {
        if std < self.low {
            ActivityLevel::Low
        } else if std < self.high {
            ActivityLevel::Medium
        } else {
            ActivityLevel::High
        }
    }
}

/// Reduce `values` according to `level`.
///
/// At `Medium` an incomplete trailing group is dropped, so the output holds
/// `values.len() / 4` means.
pub fn aggregate(values: &[f64], mean: f64, level: ActivityLevel) -> Vec<f64> {
    match level {
        ActivityLevel::Low => vec![mean],
        ActivityLevel::Medium => values
            .chunks_exact(MEDIUM_GROUP_SIZE)
            .map(|group| group.iter().sum::<f64>() / MEDIUM_GROUP_SIZE as f64)
            .collect(),
        ActivityLevel::High => values.to_vec(),
    }
}
