//! Audit module for the sensor analytics pipeline.
//!
//! Counts what the pipeline ingested, skipped and reported so that
//! non-fatal conditions stay visible without interrupting processing.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, read_history, AuditEvent, AuditLog, AuditStats, SessionRecord,
    SharedAuditLog,
};
