//! Iterative numeric approximations shared by the statistics and spectral code.
//!
//! The square root is a bounded Babylonian iteration and the trigonometric
//! functions are truncated Taylor series. Both are deterministic and
//! allocation-free.

use crate::error::{PipelineError, Result};
use std::f64::consts::FRAC_PI_2;

/// Upper bound on Babylonian iterations.
pub const SQRT_MAX_ITERATIONS: usize = 50;

/// Early-exit tolerance on `|x² - v|`.
pub const SQRT_TOLERANCE: f64 = 0.001;

/// Number of terms in each truncated series.
const TAYLOR_TERMS: usize = 5;

/// Square root by Babylonian (Newton) iteration.
///
/// Starts from `x₀ = v` and stops after [`SQRT_MAX_ITERATIONS`] steps or as
/// soon as `|x² - v| < SQRT_TOLERANCE`. Negative or non-finite input is
/// rejected rather than iterated.
pub fn sqrt_approx(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(PipelineError::InvalidInput(format!(
            "square root of {value} is undefined"
        )));
    }
    if value == 0.0 {
        return Ok(0.0);
    }

    let mut x = value;
    for _ in 0..SQRT_MAX_ITERATIONS {
        x = 0.5 * (x + value / x);
        if (x * x - value).abs() < SQRT_TOLERANCE {
            break;
        }
    }

    Ok(x)
}

/// Sine from a 5-term Taylor series.
///
/// The argument is reduced to `r` in `[-π/4, π/4]` plus a quadrant, so the
/// truncated series stays within ~3e-8 of the true value.
pub fn sin_approx(x: f64) -> f64 {
    let (quadrant, r) = reduce(x);
    match quadrant {
        0 => sin_series(r),
        1 => cos_series(r),
        2 => -sin_series(r),
        _ => -cos_series(r),
    }
}

/// Cosine from a 5-term Taylor series, reduced like [`sin_approx`].
pub fn cos_approx(x: f64) -> f64 {
    let (quadrant, r) = reduce(x);
    match quadrant {
        0 => cos_series(r),
        1 => -sin_series(r),
        2 => -cos_series(r),
        _ => sin_series(r),
    }
}

/// Split `x` into `q·π/2 + r` with `|r| <= π/4`; returns `(q mod 4, r)`.
fn reduce(x: f64) -> (i64, f64) {
    let q = (x / FRAC_PI_2).round();
    let r = x - q * FRAC_PI_2;
    ((q as i64).rem_euclid(4), r)
}

fn sin_series(r: f64) -> f64 {
    let r2 = r * r;
    let mut term = r;
    let mut sum = r;
    for n in 1..TAYLOR_TERMS {
        let k = (2 * n) as f64;
        term *= -r2 / (k * (k + 1.0));
        sum += term;
    }
    sum
}

fn cos_series(r: f64) -> f64 {
    let r2 = r * r;
    let mut term = 1.0;
    let mut sum = 1.0;
    for n in 1..TAYLOR_TERMS {
        let k = (2 * n) as f64;
        term *= -r2 / ((k - 1.0) * k);
        sum += term;
    }
    sum
}
