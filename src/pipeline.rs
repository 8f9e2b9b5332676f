//! Multi-channel streaming pipeline.
//!
//! A [`Pipeline`] owns one [`Channel`] per configured name. Configuration is
//! validated once in [`Pipeline::new`]; after that no per-sample operation
//! can fail on structural grounds.
//!
//! Samples arrive either one at a time through [`Pipeline::push_sample`] or
//! as whole ticks through [`Pipeline::ingest`]. Cross-channel metrics in a
//! [`TickOutput`] are only computed once every channel has received its
//! sample for the tick.

use crate::audit::{create_shared_log, AuditEvent, SharedAuditLog};
use crate::config::PipelineConfig;
use crate::core::analysis::Analyzer;
use crate::core::buffer::BoundedBuffer;
use crate::core::cross::CrossMetrics;
use crate::core::report::{Report, ReportBuilder, TickOutput};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Handle to a channel inside one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(usize);

impl ChannelId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named stream of samples with its own bounded history.
#[derive(Debug, Clone)]
pub struct Channel {
    name: String,
    buffer: BoundedBuffer,
}

impl Channel {
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            buffer: BoundedBuffer::new(capacity)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffer(&self) -> &BoundedBuffer {
        &self.buffer
    }
}

/// The streaming analytics pipeline.
pub struct Pipeline {
    channels: Vec<Channel>,
    analyzer: Analyzer,
    builder: ReportBuilder,
    audit: SharedAuditLog,
    report_every: usize,
    ticks_since_report: usize,
    ticks: u64,
}

impl Pipeline {
    /// Validate `config` and create empty channels.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let analyzer = Analyzer::new(&config)?;

        if config.channels.is_empty() {
            return Err(PipelineError::PreconditionViolation(
                "at least one channel must be configured".to_string(),
            ));
        }
        if config.report_every == 0 {
            return Err(PipelineError::PreconditionViolation(
                "report trigger count must be at least 1".to_string(),
            ));
        }
        for (i, name) in config.channels.iter().enumerate() {
            if config.channels[..i].contains(name) {
                return Err(PipelineError::PreconditionViolation(format!(
                    "duplicate channel name: {name}"
                )));
            }
        }

        let channels = config
            .channels
            .iter()
            .map(|name| Channel::new(name.as_str(), config.buffer_capacity))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            channels = channels.len(),
            capacity = config.buffer_capacity,
            "pipeline created"
        );

        Ok(Self {
            channels,
            analyzer,
            builder: ReportBuilder::new(),
            audit: create_shared_log(),
            report_every: config.report_every,
            ticks_since_report: 0,
            ticks: 0,
        })
    }

    /// Record counters into a caller-owned audit log.
    pub fn with_audit_log(mut self, audit: SharedAuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Use a caller-supplied report builder (e.g. with a session ID).
    pub fn with_report_builder(mut self, builder: ReportBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn audit_log(&self) -> &SharedAuditLog {
        &self.audit
    }

    /// Look up a channel by name.
    pub fn channel_id(&self, name: &str) -> Option<ChannelId> {
        self.channels
            .iter()
            .position(|c| c.name == name)
            .map(ChannelId)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Ticks ingested so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn channel(&self, id: ChannelId) -> Result<&Channel> {
        self.channels
            .get(id.0)
            .ok_or_else(|| PipelineError::UnknownChannel(format!("#{}", id.0)))
    }

    /// Push one reading into a channel.
    ///
    /// Non-finite readings cannot be stored; they are logged, counted as
    /// skipped and otherwise ignored.
    pub fn push_sample(&mut self, id: ChannelId, value: f64) -> Result<()> {
        let channel = self
            .channels
            .get_mut(id.0)
            .ok_or_else(|| PipelineError::UnknownChannel(format!("#{}", id.0)))?;

        if !value.is_finite() {
            tracing::warn!(channel = %channel.name, value, "skipping non-finite sample");
            self.audit.record(AuditEvent::SampleSkipped);
            return Ok(());
        }

        if channel.buffer.push(value).is_some() {
            self.audit.record(AuditEvent::SampleEvicted);
        }
        self.audit.record(AuditEvent::SampleIngested);
        Ok(())
    }

    /// Read-only copy of a channel's buffer, oldest first.
    pub fn buffer_snapshot(&self, id: ChannelId) -> Result<Vec<f64>> {
        Ok(self.channel(id)?.buffer.to_vec())
    }

    /// Analyse a channel's current window.
    pub fn compute_report(&self, id: ChannelId) -> Result<Report> {
        let channel = self.channel(id)?;
        let analysis = self.analyzer.analyze(&channel.buffer.to_vec())?;

        if analysis.is_degenerate() {
            tracing::debug!(channel = %channel.name, "zero deviation, using sentinel values");
            self.audit.record(AuditEvent::DegenerateSignal);
        }
        self.audit.record(AuditEvent::ReportEmitted);

        Ok(self.builder.build(&channel.name, analysis))
    }

    /// Distance and correlation between two channels.
    pub fn cross_metrics(&self, a: ChannelId, b: ChannelId) -> Result<CrossMetrics> {
        let x = self.channel(a)?;
        let y = self.channel(b)?;
        let metrics =
            CrossMetrics::compute(&x.name, &x.buffer.to_vec(), &y.name, &y.buffer.to_vec())?;

        if metrics.degenerate {
            self.audit.record(AuditEvent::DegenerateSignal);
        }
        Ok(metrics)
    }

    /// Push one reading per channel, in channel order, as a single tick.
    ///
    /// Once `report_every` ticks have accumulated, every channel is reported
    /// and every channel pair is compared; the counter then restarts.
    pub fn ingest(&mut self, readings: &[f64]) -> Result<Option<TickOutput>> {
        if readings.len() != self.channels.len() {
            return Err(PipelineError::ChannelCountMismatch {
                expected: self.channels.len(),
                actual: readings.len(),
            });
        }

        for (i, &value) in readings.iter().enumerate() {
            self.push_sample(ChannelId(i), value)?;
        }
        self.ticks += 1;
        self.ticks_since_report += 1;

        if self.ticks_since_report < self.report_every {
            return Ok(None);
        }
        self.ticks_since_report = 0;

        let reports = (0..self.channels.len())
            .map(|i| self.compute_report(ChannelId(i)))
            .collect::<Result<Vec<_>>>()?;

        let mut cross = Vec::new();
        for a in 0..self.channels.len() {
            for b in a + 1..self.channels.len() {
                cross.push(self.cross_metrics(ChannelId(a), ChannelId(b))?);
            }
        }

        Ok(Some(TickOutput {
            tick: self.ticks,
            reports,
            cross,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::ActivityLevel;

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_channel_lookup() {
        let pipeline = pipeline();
        assert_eq!(pipeline.channel_count(), 2);
        assert!(pipeline.channel_id("light").is_some());
        assert!(pipeline.channel_id("humidity").is_none());
        assert_eq!(
            pipeline.channel_names().collect::<Vec<_>>(),
            vec!["light", "temperature"]
        );
    }

    #[test]
    fn test_construction_validates_config() {
        let config = PipelineConfig {
            channels: vec!["a".to_string(), "a".to_string()],
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(config).is_err());

        let config = PipelineConfig {
            channels: Vec::new(),
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(config).is_err());

        let config = PipelineConfig {
            report_every: 0,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(config).is_err());

        let config = PipelineConfig {
            buffer_capacity: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(PipelineError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn test_push_and_snapshot() {
        let mut pipeline = pipeline();
        let light = pipeline.channel_id("light").unwrap();

        for v in 0..15 {
            pipeline.push_sample(light, v as f64).unwrap();
        }

        let expected: Vec<f64> = (3..15).map(|v| v as f64).collect();
        assert_eq!(pipeline.buffer_snapshot(light).unwrap(), expected);

        let stats = pipeline.audit_log().stats();
        assert_eq!(stats.samples_ingested, 15);
        assert_eq!(stats.samples_evicted, 3);
    }

    #[test]
    fn test_non_finite_samples_are_skipped() {
        let mut pipeline = pipeline();
        let light = pipeline.channel_id("light").unwrap();

        pipeline.push_sample(light, 1.0).unwrap();
        pipeline.push_sample(light, f64::NAN).unwrap();
        pipeline.push_sample(light, f64::INFINITY).unwrap();
        pipeline.push_sample(light, 2.0).unwrap();

        assert_eq!(pipeline.buffer_snapshot(light).unwrap(), vec![1.0, 2.0]);
        assert_eq!(pipeline.audit_log().stats().samples_skipped, 2);
    }

    #[test]
    fn test_unknown_channel() {
        let mut pipeline = pipeline();
        let bogus = ChannelId(9);
        assert!(matches!(
            pipeline.push_sample(bogus, 1.0),
            Err(PipelineError::UnknownChannel(_))
        ));
        assert!(pipeline.buffer_snapshot(bogus).is_err());
        assert!(pipeline.compute_report(bogus).is_err());
    }

    #[test]
    fn test_report_on_empty_channel() {
        let pipeline = pipeline();
        let light = pipeline.channel_id("light").unwrap();
        let report = pipeline.compute_report(light).unwrap();

        assert_eq!(report.sample_count, 0);
        assert_eq!(report.mean, 0.0);
        assert_eq!(report.aggregation_level, ActivityLevel::Low);
        assert_eq!(report.sax_symbols.as_str(), "BBBB");
        assert_eq!(report.spectral_entropy, 0.0);
    }

    #[test]
    fn test_ingest_triggers_every_n_ticks() {
        let mut pipeline = pipeline();

        for tick in 1..=11 {
            let out = pipeline.ingest(&[tick as f64, 20.0]).unwrap();
            assert!(out.is_none());
        }

        let out = pipeline.ingest(&[12.0, 20.0]).unwrap().unwrap();
        assert_eq!(out.tick, 12);
        assert_eq!(out.reports.len(), 2);
        assert_eq!(out.cross.len(), 1);
        assert_eq!(out.cross[0].channel_a, "light");
        assert_eq!(out.cross[0].channel_b, "temperature");
        assert!(out.cross[0].degenerate);

        // Counter restarts
        assert!(pipeline.ingest(&[13.0, 20.0]).unwrap().is_none());
        assert_eq!(pipeline.ticks(), 13);
    }

    #[test]
    fn test_ingest_rejects_wrong_width() {
        let mut pipeline = pipeline();
        assert_eq!(
            pipeline.ingest(&[1.0]),
            Err(PipelineError::ChannelCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}
