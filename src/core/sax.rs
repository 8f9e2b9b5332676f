//! Symbolic Aggregate approXimation (SAX) encoding.
//!
//! A window is z-normalised, reduced to `F` segment means (PAA) and each mean
//! is mapped onto a four-letter alphabet through fixed Gaussian breakpoints.

use crate::core::stats::Statistics;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Symbols, lowest first.
pub const SAX_ALPHABET: [char; 4] = ['A', 'B', 'C', 'D'];

/// Ascending breakpoints separating the alphabet.
pub const SAX_BREAKPOINTS: [f64; 3] = [-0.67, 0.0, 0.67];

/// Default number of PAA segments.
pub const DEFAULT_SAX_FRAGMENTS: usize = 4;

/// A SAX encoding, earliest segment first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaxWord(String);

impl SaxWord {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SaxWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoder for a fixed fragment count.
#[derive(Debug, Clone, Copy)]
pub struct SaxEncoder {
    fragments: usize,
}

impl SaxEncoder {
    /// Create an encoder producing `fragments` symbols per word.
    pub fn new(fragments: usize) -> Result<Self> {
        if fragments == 0 {
            return Err(PipelineError::PreconditionViolation(
                "SAX fragment count must be at least 1".to_string(),
            ));
        }
        Ok(Self { fragments })
    }

    /// Check that a buffer capacity splits evenly into fragments.
    pub fn check_capacity(&self, capacity: usize) -> Result<()> {
        if capacity % self.fragments != 0 {
            return Err(PipelineError::PreconditionViolation(format!(
                "buffer capacity {capacity} is not divisible by {} SAX fragments",
                self.fragments
            )));
        }
        Ok(())
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Encode `values`, computing statistics on the way.
    pub fn encode(&self, values: &[f64]) -> Result<SaxWord> {
        let stats = Statistics::compute(values)?;
        Ok(self.encode_with(values, &stats))
    }

    /// Encode `values` with precomputed statistics.
    ///
    /// With zero deviation every normalised sample is `0`, so a constant
    /// window encodes to the symbol just above the middle breakpoint.
    pub fn encode_with(&self, values: &[f64], stats: &Statistics) -> SaxWord {
        let normalized = z_normalize(values, stats);
        let word = paa(&normalized, self.fragments)
            .into_iter()
            .map(symbol_for)
            .collect();
        SaxWord(word)
    }
}

/// `(x - mean) / std`, or all zeros for a degenerate signal.
pub fn z_normalize(values: &[f64], stats: &Statistics) -> Vec<f64> {
    try_z_normalize(values, stats).unwrap_or_else(|_| vec![0.0; values.len()])
}

/// `(x - mean) / std`, refusing a window with zero deviation.
pub fn try_z_normalize(values: &[f64], stats: &Statistics) -> Result<Vec<f64>> {
    if stats.is_degenerate() {
        return Err(PipelineError::DegenerateSignal(format!(
            "cannot normalise {} samples with zero deviation",
            values.len()
        )));
    }
    Ok(values.iter().map(|&v| (v - stats.mean) / stats.std).collect())
}

/// Piecewise aggregate approximation into `segments` contiguous means.
///
/// Segment `i` covers `[i·len/segments, (i+1)·len/segments)`. When the length
/// is a multiple of `segments` these are equal slices; an empty segment (only
/// possible on a partially filled window) averages to `0`.
pub fn paa(values: &[f64], segments: usize) -> Vec<f64> {
    let len = values.len();
    (0..segments)
        .map(|i| {
            let start = i * len / segments;
            let end = (i + 1) * len / segments;
            let segment = &values[start..end];
            if segment.is_empty() {
                0.0
            } else {
                segment.iter().sum::<f64>() / segment.len() as f64
            }
        })
        .collect()
}

/// Map a segment mean onto the alphabet.
pub fn symbol_for(value: f64) -> char {
    SAX_BREAKPOINTS
        .iter()
        .position(|&b| value <= b)
        .map(|i| SAX_ALPHABET[i])
        .unwrap_or(SAX_ALPHABET[SAX_ALPHABET.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_mapping() {
        assert_eq!(symbol_for(-2.0), 'A');
        assert_eq!(symbol_for(-0.67), 'A');
        assert_eq!(symbol_for(-0.5), 'B');
        assert_eq!(symbol_for(0.0), 'B');
        assert_eq!(symbol_for(0.3), 'C');
        assert_eq!(symbol_for(0.67), 'C');
        assert_eq!(symbol_for(0.7), 'D');
    }

    #[test]
    fn test_constant_window() {
        let encoder = SaxEncoder::new(4).unwrap();
        let word = encoder.encode(&[10.0; 12]).unwrap();
        assert_eq!(word.as_str(), "BBBB");
    }

    #[test]
    fn test_inexact_constant_windows() {
        let encoder = SaxEncoder::new(4).unwrap();
        for c in [0.1, 3.3, 21.3] {
            assert_eq!(encoder.encode(&[c; 12]).unwrap().as_str(), "BBBB");
        }
    }

    #[test]
    fn test_strict_normalisation_rejects_flat_window() {
        let flat = [0.1; 12];
        let stats = Statistics::compute(&flat).unwrap();
        assert!(matches!(
            try_z_normalize(&flat, &stats),
            Err(PipelineError::DegenerateSignal(_))
        ));
        assert_eq!(z_normalize(&flat, &stats), vec![0.0; 12]);

        let ramp: Vec<f64> = (1..=4).map(|v| v as f64).collect();
        let stats = Statistics::compute(&ramp).unwrap();
        let z = try_z_normalize(&ramp, &stats).unwrap();
        assert!(z[0] < 0.0 && z[3] > 0.0);
    }

    #[test]
    fn test_ramp_window() {
        let encoder = SaxEncoder::new(4).unwrap();
        let values: Vec<f64> = (1..=12).map(|v| v as f64).collect();
        let word = encoder.encode(&values).unwrap();
        assert_eq!(word.to_string(), "BBCC");
    }

    #[test]
    fn test_step_windows() {
        let encoder = SaxEncoder::new(4).unwrap();
        let values = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0];
        // std = sqrt(12 * 50²) ≈ 173.2, so each half sits at z ≈ ±0.289
        let word = encoder.encode(&values).unwrap();
        assert_eq!(word.as_str(), "BBCC");

        // mean 12.5, std 75: zeros at z ≈ -0.17, the tail at z = 0.5
        let spiky = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 50.0, 50.0, 50.0];
        let word = encoder.encode(&spiky).unwrap();
        assert_eq!(word.as_str(), "BBBC");
    }

    #[test]
    fn test_outer_symbols_from_external_statistics() {
        let encoder = SaxEncoder::new(4).unwrap();
        let values = [-2.0, -2.0, -0.5, -0.5, 0.5, 0.5, 2.0, 2.0];
        let stats = Statistics {
            mean: 0.0,
            ssd: 0.0,
            std: 1.0,
        };
        assert_eq!(encoder.encode_with(&values, &stats).as_str(), "ABCD");
    }

    #[test]
    fn test_length_always_fragments() {
        let encoder = SaxEncoder::new(4).unwrap();
        for len in 0..=12 {
            let values: Vec<f64> = (0..len).map(|v| (v * v) as f64).collect();
            assert_eq!(encoder.encode(&values).unwrap().len(), 4);
        }
    }

    #[test]
    fn test_paa_equal_segments() {
        let values: Vec<f64> = (1..=8).map(|v| v as f64).collect();
        assert_eq!(paa(&values, 4), vec![1.5, 3.5, 5.5, 7.5]);
    }

    #[test]
    fn test_paa_short_input() {
        assert_eq!(paa(&[2.0, 4.0], 4), vec![0.0, 2.0, 0.0, 4.0]);
    }

    #[test]
    fn test_capacity_check() {
        let encoder = SaxEncoder::new(4).unwrap();
        assert!(encoder.check_capacity(12).is_ok());
        assert!(matches!(
            encoder.check_capacity(10),
            Err(PipelineError::PreconditionViolation(_))
        ));
        assert!(SaxEncoder::new(0).is_err());
    }
}
