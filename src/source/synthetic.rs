//! Synthetic waveform source.
//!
//! Stands in for real sensor acquisition: each channel follows a simple
//! waveform, optionally with additive noise.

use crate::source::{SampleGenerator, SourceError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Shape of one synthetic channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Waveform {
    Constant { value: f64 },
    Ramp { start: f64, step: f64 },
    Sine { offset: f64, amplitude: f64, period_ticks: f64 },
    Noise { offset: f64, amplitude: f64 },
}

impl Waveform {
    /// Parse a waveform name with default parameters.
    pub fn from_name(name: &str) -> Result<Self, SourceError> {
        match name.trim().to_lowercase().as_str() {
            "constant" => Ok(Waveform::Constant { value: 10.0 }),
            "ramp" => Ok(Waveform::Ramp {
                start: 1.0,
                step: 1.0,
            }),
            "sine" => Ok(Waveform::Sine {
                offset: 500.0,
                amplitude: 400.0,
                period_ticks: 4.0,
            }),
            "noise" => Ok(Waveform::Noise {
                offset: 20.0,
                amplitude: 5.0,
            }),
            other => Err(SourceError::Invalid(format!("unknown waveform: {other}"))),
        }
    }

    /// Value at tick `n`.
    pub fn sample(&self, n: u64, rng: &mut impl Rng) -> f64 {
        match *self {
            Waveform::Constant { value } => value,
            Waveform::Ramp { start, step } => start + step * n as f64,
            Waveform::Sine {
                offset,
                amplitude,
                period_ticks,
            } => offset + amplitude * (TAU * n as f64 / period_ticks).sin(),
            Waveform::Noise { offset, amplitude } => {
                offset + amplitude * rng.random_range(-1.0..=1.0)
            }
        }
    }
}

/// Generates ticks from one waveform per channel.
pub struct SyntheticGenerator {
    waveforms: Vec<Waveform>,
    tick: u64,
    rng: StdRng,
}

impl SyntheticGenerator {
    pub fn new(waveforms: Vec<Waveform>) -> Self {
        Self {
            waveforms,
            tick: 0,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic noise for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Parse a comma-separated list of waveform names.
    pub fn from_csv(s: &str) -> Result<Self, SourceError> {
        let waveforms = s
            .split(',')
            .map(Waveform::from_name)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(waveforms))
    }
}

impl SampleGenerator for SyntheticGenerator {
    fn next_readings(&mut self) -> Option<Vec<f64>> {
        let n = self.tick;
        self.tick += 1;
        let rng = &mut self.rng;
        Some(self.waveforms.iter().map(|w| w.sample(n, &mut *rng)).collect())
    }

    fn width(&self) -> usize {
        self.waveforms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_names() {
        assert!(matches!(
            Waveform::from_name("Sine"),
            Ok(Waveform::Sine { .. })
        ));
        assert!(Waveform::from_name("square").is_err());
    }

    #[test]
    fn test_ramp_and_constant() {
        let mut generator = SyntheticGenerator::from_csv("ramp,constant").unwrap();
        assert_eq!(generator.width(), 2);
        assert_eq!(generator.next_readings(), Some(vec![1.0, 10.0]));
        assert_eq!(generator.next_readings(), Some(vec![2.0, 10.0]));
    }

    #[test]
    fn test_noise_within_amplitude() {
        let mut generator = SyntheticGenerator::new(vec![Waveform::Noise {
            offset: 0.0,
            amplitude: 2.0,
        }])
        .with_seed(7);

        for _ in 0..100 {
            let v = generator.next_readings().unwrap()[0];
            assert!((-2.0..=2.0).contains(&v));
        }
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let noise = vec![Waveform::Noise {
            offset: 1.0,
            amplitude: 1.0,
        }];
        let mut a = SyntheticGenerator::new(noise.clone()).with_seed(3);
        let mut b = SyntheticGenerator::new(noise).with_seed(3);
        for _ in 0..10 {
            assert_eq!(a.next_readings(), b.next_readings());
        }
    }
}
