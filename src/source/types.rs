//! Tick types delivered by sample sources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reading per channel, taken at the same sampling moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// When the readings were produced
    pub timestamp: DateTime<Utc>,
    /// Readings in channel order
    pub readings: Vec<f64>,
}

impl Tick {
    pub fn new(readings: Vec<f64>) -> Self {
        Self {
            timestamp: Utc::now(),
            readings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_creation() {
        let before = Utc::now();
        let tick = Tick::new(vec![1.0, 2.0]);
        assert_eq!(tick.readings, vec![1.0, 2.0]);
        assert!(tick.timestamp >= before);
    }
}
