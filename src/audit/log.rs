//! Pipeline audit log.
//!
//! One atomic counter per [`AuditEvent`]. At the end of a run the host
//! appends a [`SessionRecord`] line to a JSON-lines history file; earlier
//! sessions are never merged back into the live counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const EVENT_COUNT: usize = 5;

/// Something the pipeline counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    /// A sample stored in a channel buffer
    SampleIngested,
    /// A non-finite reading that was dropped
    SampleSkipped,
    /// The oldest sample pushed out of a full buffer
    SampleEvicted,
    ReportEmitted,
    /// A report or correlation over a zero-deviation window
    DegenerateSignal,
}

impl AuditEvent {
    pub const ALL: [AuditEvent; EVENT_COUNT] = [
        AuditEvent::SampleIngested,
        AuditEvent::SampleSkipped,
        AuditEvent::SampleEvicted,
        AuditEvent::ReportEmitted,
        AuditEvent::DegenerateSignal,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    /// Label used in the human-readable summary.
    pub fn label(self) -> &'static str {
        match self {
            AuditEvent::SampleIngested => "Samples ingested",
            AuditEvent::SampleSkipped => "Samples skipped",
            AuditEvent::SampleEvicted => "Samples evicted",
            AuditEvent::ReportEmitted => "Reports emitted",
            AuditEvent::DegenerateSignal => "Degenerate signals",
        }
    }
}

/// Live counters for one pipeline session.
#[derive(Debug)]
pub struct AuditLog {
    counters: [AtomicU64; EVENT_COUNT],
    started_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            counters: Default::default(),
            started_at: Utc::now(),
        }
    }

    pub fn record(&self, event: AuditEvent) {
        self.counters[event.slot()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self, event: AuditEvent) -> u64 {
        self.counters[event.slot()].load(Ordering::Relaxed)
    }

    /// Snapshot of every counter.
    pub fn stats(&self) -> AuditStats {
        AuditStats {
            samples_ingested: self.count(AuditEvent::SampleIngested),
            samples_skipped: self.count(AuditEvent::SampleSkipped),
            samples_evicted: self.count(AuditEvent::SampleEvicted),
            reports_emitted: self.count(AuditEvent::ReportEmitted),
            degenerate_signals: self.count(AuditEvent::DegenerateSignal),
            started_at: self.started_at,
            elapsed_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        }
    }

    /// Multi-line summary for the terminal.
    pub fn summary(&self) -> String {
        let mut out = String::from("Session Statistics:");
        for event in AuditEvent::ALL {
            out.push_str(&format!("\n - {}: {}", event.label(), self.count(event)));
        }
        out.push_str(&format!(
            "\n - Session duration: {} seconds",
            self.stats().elapsed_secs
        ));
        out
    }

    /// Append this session as one JSON line to `path`.
    pub fn append_to(&self, path: &Path, session_id: Option<&str>) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let record = SessionRecord {
            session_id: session_id.map(str::to_string),
            ended_at: Utc::now(),
            stats: self.stats(),
        };
        let line = serde_json::to_string(&record).map_err(std::io::Error::other)?;

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStats {
    pub samples_ingested: u64,
    pub samples_skipped: u64,
    pub samples_evicted: u64,
    pub reports_emitted: u64,
    pub degenerate_signals: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: u64,
}

/// One finished session in the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub ended_at: DateTime<Utc>,
    #[serde(flatten)]
    pub stats: AuditStats,
}

/// Read every session recorded in `path`; a missing file is an empty history.
///
/// Lines that do not parse are skipped with a warning.
pub fn read_history(path: &Path) -> std::io::Result<Vec<SessionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(line = line_no + 1, "unreadable audit record: {e}"),
        }
    }
    Ok(records)
}

/// Thread-safe shared audit log.
pub type SharedAuditLog = Arc<AuditLog>;

pub fn create_shared_log() -> SharedAuditLog {
    Arc::new(AuditLog::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let log = AuditLog::new();

        log.record(AuditEvent::SampleIngested);
        log.record(AuditEvent::SampleIngested);
        log.record(AuditEvent::SampleSkipped);
        log.record(AuditEvent::ReportEmitted);

        let stats = log.stats();
        assert_eq!(stats.samples_ingested, 2);
        assert_eq!(stats.samples_skipped, 1);
        assert_eq!(stats.reports_emitted, 1);
        assert_eq!(stats.samples_evicted, 0);
        assert_eq!(log.count(AuditEvent::DegenerateSignal), 0);
    }

    #[test]
    fn test_sessions_append_without_merging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.jsonl");

        let first = AuditLog::new();
        first.record(AuditEvent::SampleIngested);
        first.record(AuditEvent::DegenerateSignal);
        first.append_to(&path, Some("SESS-1")).unwrap();

        let second = AuditLog::new();
        second.record(AuditEvent::SampleEvicted);
        second.append_to(&path, None).unwrap();

        let history = read_history(&path).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].session_id.as_deref(), Some("SESS-1"));
        assert_eq!(history[0].stats.samples_ingested, 1);
        assert_eq!(history[0].stats.degenerate_signals, 1);
        assert_eq!(history[1].session_id, None);
        assert_eq!(history[1].stats.samples_ingested, 0);
        assert_eq!(history[1].stats.samples_evicted, 1);
    }

    #[test]
    fn test_history_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        assert!(read_history(&path).unwrap().is_empty());

        AuditLog::new().append_to(&path, Some("ok")).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{ truncated").unwrap();

        let history = read_history(&path).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].session_id.as_deref(), Some("ok"));
    }

    #[test]
    fn test_summary_lists_every_event() {
        let summary = AuditLog::new().summary();
        for event in AuditEvent::ALL {
            assert!(summary.contains(event.label()));
        }
        assert!(summary.contains("Session duration"));
    }
}
