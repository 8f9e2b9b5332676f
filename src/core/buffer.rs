//! Fixed-capacity FIFO sample store.
//!
//! Each channel keeps its recent history in a [`BoundedBuffer`]. Storage is
//! allocated once at construction; once the buffer is full every push evicts
//! exactly one sample, the oldest.

use crate::error::{PipelineError, Result};
use std::collections::VecDeque;

/// Bounded ring of samples, ordered oldest to newest.
#[derive(Debug, Clone)]
pub struct BoundedBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl BoundedBuffer {
    /// Create an empty buffer holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::PreconditionViolation(
                "buffer capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a sample, evicting the oldest one first when full.
    ///
    /// Returns the evicted sample, if any.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };

        self.samples.push_back(value);
        evicted
    }

    /// Sample at `index`, counted from the oldest.
    pub fn at(&self, index: usize) -> Result<f64> {
        self.samples
            .get(index)
            .copied()
            .ok_or(PipelineError::IndexOutOfRange {
                index,
                len: self.samples.len(),
            })
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// Copy the current contents into a contiguous vector.
    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
