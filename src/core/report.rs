//! Structured per-channel reports handed to the reporting collaborator.
//!
//! The core never formats text; a [`Report`] is plain data that serialises
//! to JSON for export or logging.

use crate::core::aggregate::ActivityLevel;
use crate::core::analysis::ChannelAnalysis;
use crate::core::cross::CrossMetrics;
use crate::core::sax::SaxWord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The name of this producer.
pub const PRODUCER_NAME: &str = "sensor-analytics";

/// Producer metadata stamped on every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: Uuid,
}

/// Analysis of one channel at one measurement moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub producer: ReportProducer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub channel: String,
    pub computed_at: DateTime<Utc>,
    pub sample_count: usize,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub ema: f64,
    pub aggregation_level: ActivityLevel,
    pub reduced_values: Vec<f64>,
    pub sax_symbols: SaxWord,
    pub spectral_entropy: f64,
    /// Zero deviation: SAX and correlation fell back to sentinels
    pub degenerate: bool,
}

/// Everything produced when a tick fires the trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutput {
    /// Tick number since the pipeline was created, starting at 1
    pub tick: u64,
    pub reports: Vec<Report>,
    pub cross: Vec<CrossMetrics>,
}

/// Builder that stamps producer metadata onto analyses.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    instance_id: Uuid,
    session_id: Option<String>,
}

impl ReportBuilder {
    /// Create a builder with a fresh instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            session_id: None,
        }
    }

    /// Set the session ID for generated reports.
    pub fn with_session_id(mut self, session_id: String) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Wrap a channel analysis into a report.
    pub fn build(&self, channel: &str, analysis: ChannelAnalysis) -> Report {
        let degenerate = analysis.is_degenerate();
        Report {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: crate::VERSION.to_string(),
                instance_id: self.instance_id,
            },
            session_id: self.session_id.clone(),
            channel: channel.to_string(),
            computed_at: Utc::now(),
            sample_count: analysis.sample_count,
            mean: analysis.stats.mean,
            std: analysis.stats.std,
            median: analysis.median,
            ema: analysis.ema,
            aggregation_level: analysis.activity_level,
            reduced_values: analysis.reduced_values,
            sax_symbols: analysis.sax,
            spectral_entropy: analysis.spectral_entropy,
            degenerate,
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
