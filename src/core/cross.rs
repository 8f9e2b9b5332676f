//! Distance and correlation between two parallel channels.
//!
//! Samples are paired by position, oldest with oldest. When the channels
//! hold different numbers of samples both are truncated to the shorter
//! length before any metric is computed.

use crate::core::stats::{mean, std_dev};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Metrics between two channels at one tick boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossMetrics {
    pub channel_a: String,
    pub channel_b: String,
    /// Σ|xᵢ - yᵢ|
    pub manhattan: f64,
    /// Pearson correlation, `0` when degenerate
    pub correlation: f64,
    /// Number of paired samples
    pub paired_samples: usize,
    /// Set when either side had zero deviation
    pub degenerate: bool,
}

impl CrossMetrics {
    /// Compute both metrics for two sample sequences.
    pub fn compute(
        channel_a: impl Into<String>,
        x: &[f64],
        channel_b: impl Into<String>,
        y: &[f64],
    ) -> Result<Self> {
        let (x, y) = paired(x, y);
        let correlation = pearson_correlation(x, y)?;

        Ok(Self {
            channel_a: channel_a.into(),
            channel_b: channel_b.into(),
            manhattan: manhattan_distance(x, y),
            correlation: correlation.unwrap_or(0.0),
            paired_samples: x.len(),
            degenerate: correlation.is_none(),
        })
    }
}

/// Truncate both sequences to the shorter length.
fn paired<'a>(x: &'a [f64], y: &'a [f64]) -> (&'a [f64], &'a [f64]) {
    let n = x.len().min(y.len());
    (&x[..n], &y[..n])
}

/// Σ|xᵢ - yᵢ| over the paired prefix.
pub fn manhattan_distance(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| (a - b).abs()).sum()
}

/// Pearson correlation over the paired prefix.
///
/// Returns `Ok(None)` when either side has zero deviation; callers decide
/// on the sentinel.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Result<Option<f64>> {
    let (x, y) = paired(x, y);
    let std_x = std_dev(x)?;
    let std_y = std_dev(y)?;

    if std_x == 0.0 || std_y == 0.0 {
        tracing::debug!(
            std_x,
            std_y,
            "correlation undefined due to zero standard deviation"
        );
        return Ok(None);
    }

    let mean_x = mean(x);
    let mean_y = mean(y);
    let numerator: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();

    Ok(Some(numerator / (std_x * std_y)))
}
