//! Analytics core.
//!
//! This module contains:
//! - The bounded per-channel sample buffer
//! - Numeric approximations and running statistics
//! - Adaptive aggregation, SAX encoding and spectral analysis
//! - Cross-channel metrics and structured reports

pub mod aggregate;
pub mod analysis;
pub mod buffer;
pub mod cross;
pub mod numeric;
pub mod report;
pub mod sax;
pub mod spectral;
pub mod stats;

// Re-export commonly used types
pub use aggregate::{aggregate, ActivityLevel, Thresholds};
pub use analysis::{Analyzer, ChannelAnalysis};
pub use buffer::BoundedBuffer;
pub use cross::{manhattan_distance, pearson_correlation, CrossMetrics};
pub use numeric::{cos_approx, sin_approx, sqrt_approx};
pub use report::{Report, ReportBuilder, ReportProducer, TickOutput, PRODUCER_NAME};
pub use sax::{SaxEncoder, SaxWord};
pub use spectral::{fft, power_spectrum, spectral_entropy, Stft};
pub use stats::{mean, std_dev, sum_squared_deviation, Statistics};
