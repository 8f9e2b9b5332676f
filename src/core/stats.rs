//! Running statistics over a buffer's current contents.
//!
//! The standard deviation used throughout the pipeline is the square root of
//! the *sum* of squared deviations (not of the variance). Activity thresholds
//! and SAX normalisation are calibrated against that quantity.

use crate::core::numeric::sqrt_approx;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median};

/// Default EMA smoothing factor.
pub const DEFAULT_EMA_BETA: f64 = 0.7;

/// Statistics computed at one measurement moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Sum of squared deviations from the mean
    pub ssd: f64,
    /// `sqrt(ssd)` via the Babylonian solver
    pub std: f64,
}

impl Statistics {
    /// Compute mean, sum of squared deviation and deviation in one pass each.
    pub fn compute(values: &[f64]) -> Result<Self> {
        let mean = mean(values);
        let ssd = sum_squared_deviation(values, mean);
        let std = sqrt_approx(ssd)?;
        Ok(Self { mean, ssd, std })
    }

    /// True when the signal is constant (or empty).
    pub fn is_degenerate(&self) -> bool {
        self.std == 0.0
    }
}

/// Arithmetic mean; `0.0` for an empty slice.
///
/// A constant slice returns its value exactly, without summation rounding.
pub fn mean(values: &[f64]) -> f64 {
    match values.first() {
        None => 0.0,
        Some(&first) if is_constant(values) => first,
        Some(_) => values.iter().sum::<f64>() / values.len() as f64,
    }
}

/// Σ(xᵢ - mean)².
///
/// Exactly `0.0` for a constant slice whatever `mean` rounded to, so the
/// square root below it sees zero rather than rounding noise.
pub fn sum_squared_deviation(values: &[f64], mean: f64) -> f64 {
    if is_constant(values) {
        return 0.0;
    }
    values.iter().map(|&v| (v - mean) * (v - mean)).sum()
}

/// Every sample equals the first (vacuously true when empty).
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Square root of the sum of squared deviation.
pub fn std_dev(values: &[f64]) -> Result<f64> {
    let mean = mean(values);
    sqrt_approx(sum_squared_deviation(values, mean))
}

/// Median; `0.0` for an empty slice, mean of the middle pair for even lengths.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Data::new(values.to_vec()).median()
}

/// Exponential moving average series.
///
/// `E₀ = x₀`, `Eᵢ = β·xᵢ + (1 - β)·Eᵢ₋₁`.
pub fn ema(values: &[f64], beta: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &v in values {
        let next = match prev {
            Some(p) => beta * v + (1.0 - beta) * p,
            None => v,
        };
        out.push(next);
        prev = Some(next);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::statistics::Statistics as _;

    fn ramp() -> Vec<f64> {
        (1..=12).map(|v| v as f64).collect()
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), Ok(0.0));
    }

    #[test]
    fn test_mean_matches_statrs() {
        let values = vec![3.5, -1.0, 12.25, 7.0, 0.0, 4.75];
        assert!((mean(&values) - values.iter().mean()).abs() < 1e-12);
    }

    #[test]
    fn test_ramp_statistics() {
        let stats = Statistics::compute(&ramp()).unwrap();
        assert!((stats.mean - 6.5).abs() < 1e-12);
        assert!((stats.ssd - 143.0).abs() < 1e-9);
        assert!((stats.std - 143.0_f64.sqrt()).abs() < 0.01);
    }

    #[test]
    fn test_std_is_sqrt_of_population_variance_times_n() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let n = values.len() as f64;
        let expected = values.iter().population_std_dev() * n.sqrt();
        assert!((std_dev(&values).unwrap() - expected).abs() < 0.01);
    }

    #[test]
    fn test_constant_signal_is_degenerate() {
        let stats = Statistics::compute(&[10.0; 12]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert!(stats.is_degenerate());
    }

    #[test]
    fn test_inexact_constants_are_degenerate() {
        for c in [0.1, 3.3, 21.3] {
            let stats = Statistics::compute(&[c; 12]).unwrap();
            assert_eq!(stats.mean, c);
            assert_eq!(stats.ssd, 0.0);
            assert_eq!(stats.std, 0.0);
            assert!(stats.is_degenerate());
            assert_eq!(std_dev(&[c; 12]), Ok(0.0));
        }
    }

    #[test]
    fn test_single_sample_is_degenerate() {
        let stats = Statistics::compute(&[42.5]).unwrap();
        assert_eq!(stats.mean, 42.5);
        assert!(stats.is_degenerate());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert!((median(&[5.0, 1.0, 3.0]) - 3.0).abs() < 1e-12);
        assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_ema() {
        assert!(ema(&[], DEFAULT_EMA_BETA).is_empty());

        let series = ema(&[10.0, 20.0, 20.0], 0.7);
        assert_eq!(series.len(), 3);
        assert!((series[0] - 10.0).abs() < 1e-12);
        assert!((series[1] - 17.0).abs() < 1e-12);
        assert!((series[2] - 19.1).abs() < 1e-12);
    }
}
