//! CSV replay source.
//!
//! Each non-empty line holds one tick: comma-separated readings in channel
//! order. Lines starting with `#` are comments. A field that does not parse
//! becomes NaN so the pipeline can report and skip it without dropping the
//! rest of the tick.

use crate::source::{SampleGenerator, SourceError};
use std::collections::VecDeque;
use std::path::Path;

/// Replays ticks read from a CSV file.
#[derive(Debug, Clone)]
pub struct ReplayGenerator {
    ticks: VecDeque<Vec<f64>>,
    width: usize,
}

impl ReplayGenerator {
    /// Load every tick from `path`.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse CSV content; every tick must have the same width.
    pub fn parse(content: &str) -> Result<Self, SourceError> {
        let mut ticks = VecDeque::new();
        let mut width = None;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let readings: Vec<f64> = line
                .split(',')
                .map(|field| field.trim().parse::<f64>().unwrap_or(f64::NAN))
                .collect();

            match width {
                None => width = Some(readings.len()),
                Some(w) if w != readings.len() => {
                    return Err(SourceError::Invalid(format!(
                        "line {}: expected {w} readings, found {}",
                        line_no + 1,
                        readings.len()
                    )));
                }
                Some(_) => {}
            }
            ticks.push_back(readings);
        }

        Ok(Self {
            ticks,
            width: width.unwrap_or(0),
        })
    }

    /// Ticks not yet replayed.
    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }
}

impl SampleGenerator for ReplayGenerator {
    fn next_readings(&mut self) -> Option<Vec<f64>> {
        self.ticks.pop_front()
    }

    fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticks() {
        let mut generator = ReplayGenerator::parse("# light,temp\n1.5, 20\n\n2.5,21\n").unwrap();
        assert_eq!(generator.width(), 2);
        assert_eq!(generator.remaining(), 2);
        assert_eq!(generator.next_readings(), Some(vec![1.5, 20.0]));
        assert_eq!(generator.next_readings(), Some(vec![2.5, 21.0]));
        assert_eq!(generator.next_readings(), None);
    }

    #[test]
    fn test_bad_field_becomes_nan() {
        let mut generator = ReplayGenerator::parse("1.0,oops\n").unwrap();
        let readings = generator.next_readings().unwrap();
        assert_eq!(readings[0], 1.0);
        assert!(readings[1].is_nan());
    }

    #[test]
    fn test_ragged_lines_rejected() {
        let err = ReplayGenerator::parse("1,2\n3\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.csv");
        std::fs::write(&path, "1,2\n3,4\n").unwrap();

        let generator = ReplayGenerator::from_path(&path).unwrap();
        assert_eq!(generator.remaining(), 2);
        assert!(ReplayGenerator::from_path(&dir.path().join("missing.csv")).is_err());
    }
}
