//! Sample sources for the host binary.
//!
//! A source produces one [`Tick`] per sampling interval on a background
//! thread and delivers it over a bounded channel. The pipeline itself never
//! sees the thread; the host loop receives ticks and calls
//! [`crate::Pipeline::ingest`].

pub mod replay;
pub mod synthetic;
pub mod types;

// Re-export commonly used types
pub use replay::ReplayGenerator;
pub use synthetic::{SyntheticGenerator, Waveform};
pub use types::Tick;

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Produces the readings for successive ticks.
pub trait SampleGenerator: Send + 'static {
    /// Readings for the next tick, or `None` once the source is exhausted.
    fn next_readings(&mut self) -> Option<Vec<f64>>;

    /// Number of readings per tick.
    fn width(&self) -> usize;
}

/// Errors raised by sample sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Sampler is already running")]
    AlreadyRunning,
    #[error("Sampler was already consumed by a previous run")]
    Exhausted,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid source: {0}")]
    Invalid(String),
}

/// Drives a [`SampleGenerator`] at a fixed cadence on a background thread.
pub struct Sampler<G: SampleGenerator> {
    generator: Option<G>,
    interval: Duration,
    max_ticks: Option<u64>,
    sender: Sender<Tick>,
    receiver: Receiver<Tick>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl<G: SampleGenerator> Sampler<G> {
    /// Create a sampler emitting one tick every `interval`.
    pub fn new(generator: G, interval: Duration) -> Self {
        // Use a bounded channel to prevent unbounded memory growth
        let (sender, receiver) = bounded(1_024);

        Self {
            generator: Some(generator),
            interval,
            max_ticks: None,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Stop after `ticks` ticks even if the generator could continue.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Start sampling in a background thread.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        let mut generator = self.generator.take().ok_or(SourceError::Exhausted)?;

        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();
        let interval = self.interval;
        let max_ticks = self.max_ticks;

        let handle = thread::spawn(move || {
            let mut emitted = 0u64;
            while running.load(Ordering::SeqCst) {
                if max_ticks.is_some_and(|max| emitted >= max) {
                    break;
                }
                let Some(readings) = generator.next_readings() else {
                    break;
                };
                if sender.send(Tick::new(readings)).is_err() {
                    break;
                }
                emitted += 1;
                if !interval.is_zero() {
                    thread::sleep(interval);
                }
            }
            tracing::debug!(emitted, "sampler finished");
            running.store(false, Ordering::SeqCst);
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop sampling and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // A full channel would block the sender forever; drain it first
        while self.receiver.try_recv().is_ok() {}
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the sampler thread is still producing ticks.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for ticks.
    pub fn receiver(&self) -> &Receiver<Tick> {
        &self.receiver
    }

    /// Try to receive a tick without blocking.
    pub fn try_recv(&self) -> Option<Tick> {
        self.receiver.try_recv().ok()
    }
}

impl<G: SampleGenerator> Drop for Sampler<G> {
    fn drop(&mut self) {
        self.stop();
    }
}
