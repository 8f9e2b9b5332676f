//! Sensor Analytics - streaming analysis of scalar sensor channels.
//!
//! Samples are pushed into a bounded per-channel history. At each report
//! trigger the current window is summarised: running statistics, an
//! activity-dependent reduction, a SAX word and a spectral entropy, plus
//! distance and correlation between every pair of channels.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Sensor Analytics                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │   Source    │──▶│  Channels   │──▶│  Analyzer   │        │
//! │  │ (ticks)     │   │ (bounded)   │   │ stats/SAX/  │        │
//! │  └─────────────┘   └─────────────┘   │  spectral   │        │
//! │                           │          └─────────────┘        │
//! │                           ▼                 │               │
//! │                    ┌─────────────┐   ┌─────────────┐        │
//! │                    │Cross metrics│──▶│   Reports   │        │
//! │                    └─────────────┘   └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sensor_analytics::{Pipeline, PipelineConfig};
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let mut output = None;
//! for i in 1..=12 {
//!     output = pipeline.ingest(&[i as f64, 21.5]).unwrap();
//! }
//!
//! let output = output.expect("report fires on the twelfth tick");
//! assert_eq!(output.reports[0].sax_symbols.as_str(), "BBCC");
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod source;

// Re-export key types at crate root for convenience
pub use audit::{AuditEvent, AuditLog, AuditStats, SharedAuditLog};
pub use config::{Config, ConfigError, PipelineConfig};
pub use core::{
    ActivityLevel, BoundedBuffer, CrossMetrics, Report, ReportBuilder, SaxWord, TickOutput,
};
pub use error::{PipelineError, Result};
pub use pipeline::{Channel, ChannelId, Pipeline};
pub use source::{Sampler, SampleGenerator, SourceError, Tick};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
