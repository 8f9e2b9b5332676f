//! Spectral analysis: radix-2 FFT, short-time Fourier transform and
//! spectral entropy.
//!
//! Twiddle factors come from the Taylor-series sine and cosine in
//! [`crate::core::numeric`], so the transform never calls into libm.

use crate::core::numeric::{cos_approx, sin_approx};
use crate::error::{PipelineError, Result};
use num_complex::Complex64;
use std::f64::consts::TAU;

/// Default STFT window length.
pub const DEFAULT_CHUNK_SIZE: usize = 4;

/// Default STFT stride.
pub const DEFAULT_HOP_SIZE: usize = 2;

/// Reject lengths the radix-2 transform cannot handle.
pub fn validate_chunk_size(size: usize) -> Result<()> {
    if size == 0 || !size.is_power_of_two() {
        return Err(PipelineError::InvalidChunkSize { size });
    }
    Ok(())
}

/// In-place iterative Cooley-Tukey FFT.
pub fn fft(data: &mut [Complex64]) -> Result<()> {
    validate_chunk_size(data.len())?;
    transform(data);
    Ok(())
}

/// Transform a buffer whose length is already known to be a power of two.
fn transform(data: &mut [Complex64]) {
    let n = data.len();

    // Bit-reversal permutation
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            data.swap(i, j);
        }
    }

    // Butterfly stages
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        for k in 0..half {
            let angle = -TAU * k as f64 / len as f64;
            let w = Complex64::new(cos_approx(angle), sin_approx(angle));
            let mut start = 0;
            while start < n {
                let a = start + k;
                let b = a + half;
                let t = w * data[b];
                data[b] = data[a] - t;
                data[a] += t;
                start += len;
            }
        }
        len <<= 1;
    }
}

/// `re² + im²` per bin.
pub fn power_spectrum(bins: &[Complex64]) -> Vec<f64> {
    bins.iter().map(|c| c.norm_sqr()).collect()
}

/// Lazy sliding-window FFT over a sample slice.
///
/// Yields `floor((len - chunk_size) / hop_size) + 1` transformed chunks, or
/// none when the signal is shorter than one chunk. The sequence is finite
/// and cannot be restarted.
#[derive(Debug, Clone)]
pub struct Stft<'a> {
    values: &'a [f64],
    chunk_size: usize,
    hop_size: usize,
    next_chunk: usize,
    total_chunks: usize,
}

impl<'a> Stft<'a> {
    pub fn new(values: &'a [f64], chunk_size: usize, hop_size: usize) -> Result<Self> {
        validate_chunk_size(chunk_size)?;
        if hop_size == 0 {
            return Err(PipelineError::PreconditionViolation(
                "STFT hop size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            values,
            chunk_size,
            hop_size,
            next_chunk: 0,
            total_chunks: chunk_count(values.len(), chunk_size, hop_size),
        })
    }

    /// Total number of chunks this transform produces.
    pub fn chunk_count(&self) -> usize {
        self.total_chunks
    }
}

impl Iterator for Stft<'_> {
    type Item = Vec<Complex64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_chunk >= self.total_chunks {
            return None;
        }

        let start = self.next_chunk * self.hop_size;
        self.next_chunk += 1;

        let mut chunk: Vec<Complex64> = (start..start + self.chunk_size)
            .map(|i| Complex64::new(self.values.get(i).copied().unwrap_or(0.0), 0.0))
            .collect();
        transform(&mut chunk);
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_chunks - self.next_chunk;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Stft<'_> {}

fn chunk_count(len: usize, chunk_size: usize, hop_size: usize) -> usize {
    if len < chunk_size {
        0
    } else {
        (len - chunk_size) / hop_size + 1
    }
}

/// Bin-wise mean power over every STFT chunk; empty when no chunk fits.
pub fn average_power_spectrum(
    values: &[f64],
    chunk_size: usize,
    hop_size: usize,
) -> Result<Vec<f64>> {
    let stft = Stft::new(values, chunk_size, hop_size)?;
    let chunks = stft.chunk_count();
    if chunks == 0 {
        return Ok(Vec::new());
    }

    let mut accumulated = vec![0.0; chunk_size];
    for bins in stft {
        for (acc, power) in accumulated.iter_mut().zip(power_spectrum(&bins)) {
            *acc += power;
        }
    }

    for acc in &mut accumulated {
        *acc /= chunks as f64;
    }
    Ok(accumulated)
}

/// Shannon entropy (natural log) of the normalised average power spectrum.
///
/// A signal with no chunks or no power has entropy `0`, and empty bins
/// contribute nothing.
pub fn spectral_entropy(values: &[f64], chunk_size: usize, hop_size: usize) -> Result<f64> {
    let spectrum = average_power_spectrum(values, chunk_size, hop_size)?;
    Ok(entropy_of(&spectrum))
}

fn entropy_of(spectrum: &[f64]) -> f64 {
    let total: f64 = spectrum.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = spectrum
        .iter()
        .map(|&p| p / total)
        .filter(|&p| p > 0.0)
        .map(|p| p * p.ln())
        .sum();

    // A single occupied bin sums to -0.0; report it as a plain zero
    if weighted == 0.0 {
        0.0
    } else {
        -weighted
    }
}
