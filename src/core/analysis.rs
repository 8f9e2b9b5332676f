//! Per-channel window analysis.
//!
//! Runs the full decision pipeline over one buffer snapshot: statistics,
//! activity classification and reduction, SAX encoding and spectral entropy.

use crate::config::PipelineConfig;
use crate::core::aggregate::{aggregate, ActivityLevel, Thresholds};
use crate::core::sax::{SaxEncoder, SaxWord};
use crate::core::spectral::{spectral_entropy, validate_chunk_size};
use crate::core::stats::{ema, median, Statistics};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Everything derived from one window of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAnalysis {
    /// Samples in the analysed window
    pub sample_count: usize,
    pub stats: Statistics,
    pub median: f64,
    /// Last value of the exponential moving average
    pub ema: f64,
    pub activity_level: ActivityLevel,
    pub reduced_values: Vec<f64>,
    pub sax: SaxWord,
    pub spectral_entropy: f64,
}

impl ChannelAnalysis {
    /// True when the window had zero deviation.
    pub fn is_degenerate(&self) -> bool {
        self.stats.is_degenerate()
    }
}

/// Validated analysis settings.
#[derive(Debug, Clone)]
pub struct Analyzer {
    thresholds: Thresholds,
    sax: SaxEncoder,
    chunk_size: usize,
    hop_size: usize,
    ema_beta: f64,
}

impl Analyzer {
    /// Validate the analysis parts of a pipeline configuration.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.thresholds.validate()?;
        let sax = SaxEncoder::new(config.sax_fragments)?;
        sax.check_capacity(config.buffer_capacity)?;
        validate_chunk_size(config.chunk_size)?;

        if config.hop_size == 0 {
            return Err(PipelineError::PreconditionViolation(
                "STFT hop size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.ema_beta) {
            return Err(PipelineError::PreconditionViolation(format!(
                "EMA beta must lie in [0, 1], got {}",
                config.ema_beta
            )));
        }

        Ok(Self {
            thresholds: config.thresholds,
            sax,
            chunk_size: config.chunk_size,
            hop_size: config.hop_size,
            ema_beta: config.ema_beta,
        })
    }

    /// Analyse one window, oldest sample first.
    pub fn analyze(&self, values: &[f64]) -> Result<ChannelAnalysis> {
        let stats = Statistics::compute(values)?;
        let activity_level = self.thresholds.classify(stats.std);
        let reduced_values = aggregate(values, stats.mean, activity_level);
        let sax = self.sax.encode_with(values, &stats);
        let spectral_entropy = spectral_entropy(values, self.chunk_size, self.hop_size)?;

        Ok(ChannelAnalysis {
            sample_count: values.len(),
            stats,
            median: median(values),
            ema: ema(values, self.ema_beta).last().copied().unwrap_or(0.0),
            activity_level,
            reduced_values,
            sax,
            spectral_entropy,
        })
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> Analyzer {
        Analyzer::new(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_constant_window() {
        let analysis = analyzer().analyze(&[10.0; 12]).unwrap();

        assert!(analysis.is_degenerate());
        assert_eq!(analysis.activity_level, ActivityLevel::Low);
        assert_eq!(analysis.reduced_values, vec![10.0]);
        assert_eq!(analysis.sax.as_str(), "BBBB");
        assert!(analysis.spectral_entropy.abs() < 1e-9);
        assert_eq!(analysis.median, 10.0);
        assert!((analysis.ema - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_levels_drive_reduction() {
        let config = PipelineConfig {
            thresholds: Thresholds {
                low: 5.0,
                high: 50.0,
            },
            ..PipelineConfig::default()
        };
        let analyzer = Analyzer::new(&config).unwrap();

        // std = sqrt(143) ≈ 11.96
        let ramp: Vec<f64> = (1..=12).map(|v| v as f64).collect();
        let analysis = analyzer.analyze(&ramp).unwrap();
        assert_eq!(analysis.activity_level, ActivityLevel::Medium);
        assert_eq!(analysis.reduced_values, vec![2.5, 6.5, 10.5]);

        let steep: Vec<f64> = ramp.iter().map(|v| v * 10.0).collect();
        let analysis = analyzer.analyze(&steep).unwrap();
        assert_eq!(analysis.activity_level, ActivityLevel::High);
        assert_eq!(analysis.reduced_values.len(), 12);
    }

    #[test]
    fn test_invalid_configuration() {
        let bad_chunk = PipelineConfig {
            chunk_size: 6,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            Analyzer::new(&bad_chunk),
            Err(PipelineError::InvalidChunkSize { size: 6 })
        ));

        let bad_capacity = PipelineConfig {
            buffer_capacity: 10,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            Analyzer::new(&bad_capacity),
            Err(PipelineError::PreconditionViolation(_))
        ));

        let bad_hop = PipelineConfig {
            hop_size: 0,
            ..PipelineConfig::default()
        };
        assert!(Analyzer::new(&bad_hop).is_err());

        let bad_beta = PipelineConfig {
            ema_beta: 1.5,
            ..PipelineConfig::default()
        };
        assert!(Analyzer::new(&bad_beta).is_err());
    }
}
