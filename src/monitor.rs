//! Live monitoring of the spikes emitted by the accelerator.
//!
//! The monitor repeatedly polls a [`SpikeSource`], feeds the polled spikes to a sliding window,
//! and hands a [`Snapshot`] of the window to a [`RenderSink`].
//!
//! # Examples
//!
//! ```rust
//! use snn_accelerator::config::MonitorConfig;
//! use snn_accelerator::monitor::{Monitor, ReplaySource};
//! use snn_accelerator::spike_train::Spike;
//!
//! // Hardware timestamps are in microseconds
//! let spikes = vec![Spike::new(0, 1000.0), Spike::new(3, 2500.0), Spike::new(0, 4000.0)];
//! let source = ReplaySource::new(spikes, 2);
//!
//! let config = MonitorConfig { window_size: 10, poll_timeout_ms: 10, refresh_interval_ms: 0 };
//! let mut monitor = Monitor::build(source, &config).unwrap();
//!
//! let snapshot = monitor.update().unwrap();
//! assert_eq!(snapshot.times, vec![1.0, 2.5]);
//! let snapshot = monitor.update().unwrap();
//! assert_eq!(snapshot.unit_ids, vec![0, 3, 0]);
//! ```
use std::thread;
use std::time::Duration;

use derivative::Derivative;

use super::aggregator::{Snapshot, SpikeWindowAggregator};
use super::config::MonitorConfig;
use super::error::SNNError;
use super::spike_train::{micros_to_millis, Spike};

/// A source of spikes, e.g., the output FIFO of the accelerator.
pub trait SpikeSource {
    /// Returns the spikes that arrived since the last poll, possibly none.
    /// Timestamps are in microseconds. The call should not block for longer than `timeout`.
    fn poll_spikes(&mut self, timeout: Duration) -> Result<Vec<Spike>, SNNError>;
}

/// A consumer of window snapshots, e.g., a raster plot.
pub trait RenderSink {
    fn render(&mut self, frame: usize, snapshot: &Snapshot) -> Result<(), SNNError>;
}

impl<F> RenderSink for F
where
    F: FnMut(usize, &Snapshot) -> Result<(), SNNError>,
{
    fn render(&mut self, frame: usize, snapshot: &Snapshot) -> Result<(), SNNError> {
        self(frame, snapshot)
    }
}

/// A sink writing a one-line summary of every frame to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn render(&mut self, frame: usize, snapshot: &Snapshot) -> Result<(), SNNError> {
        log::info!(
            "Frame {}: {} spikes from {} units in window",
            frame,
            snapshot.num_spikes(),
            snapshot.counts.len()
        );
        Ok(())
    }
}

/// A source replaying recorded spikes, a fixed number per poll.
#[derive(Debug, PartialEq, Clone)]
pub struct ReplaySource {
    spikes: Vec<Spike>,
    position: usize,
    chunk_size: usize,
}

impl ReplaySource {
    /// Create a new replay source. A chunk size of zero delivers everything on the first poll.
    pub fn new(spikes: Vec<Spike>, chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 { spikes.len() } else { chunk_size };
        ReplaySource {
            spikes,
            position: 0,
            chunk_size,
        }
    }

    /// Returns the number of spikes not yet delivered.
    pub fn remaining(&self) -> usize {
        self.spikes.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl SpikeSource for ReplaySource {
    fn poll_spikes(&mut self, _timeout: Duration) -> Result<Vec<Spike>, SNNError> {
        let end = (self.position + self.chunk_size).min(self.spikes.len());
        let chunk = self.spikes[self.position..end].to_vec();
        self.position = end;
        Ok(chunk)
    }
}

/// Drives a sliding window from a spike source.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Monitor<S: SpikeSource> {
    #[derivative(Debug = "ignore")]
    source: S,
    aggregator: SpikeWindowAggregator,
    poll_timeout: Duration,
    refresh_interval: Duration,
    /// Number of updates performed so far.
    num_frames: usize,
}

impl<S: SpikeSource> Monitor<S> {
    /// Create a new monitor for the given source.
    /// Returns an error if the window size is zero.
    pub fn build(source: S, config: &MonitorConfig) -> Result<Self, SNNError> {
        Ok(Monitor {
            source,
            aggregator: SpikeWindowAggregator::build(config.window_size)?,
            poll_timeout: Duration::from_millis(config.poll_timeout_ms),
            refresh_interval: Duration::from_millis(config.refresh_interval_ms),
            num_frames: 0,
        })
    }

    pub fn aggregator(&self) -> &SpikeWindowAggregator {
        &self.aggregator
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Polls the source once, ingests the new spikes with times converted to milliseconds,
    /// and returns a snapshot of the window.
    pub fn update(&mut self) -> Result<Snapshot, SNNError> {
        let spikes = self.source.poll_spikes(self.poll_timeout)?;
        log::trace!("Frame {}: {} new spikes", self.num_frames, spikes.len());

        self.aggregator.ingest_all(
            spikes
                .into_iter()
                .map(|spike| Spike::new(spike.unit_id(), micros_to_millis(spike.time()))),
        );
        self.num_frames += 1;

        Ok(self.aggregator.snapshot())
    }

    /// Runs the given number of frames, rendering every snapshot.
    /// Stops at the first error of the source or the sink.
    pub fn run<K: RenderSink>(&mut self, sink: &mut K, num_frames: usize) -> Result<(), SNNError> {
        for i in 0..num_frames {
            if i > 0 && !self.refresh_interval.is_zero() {
                thread::sleep(self.refresh_interval);
            }
            let snapshot = self.update()?;
            sink.render(self.num_frames - 1, &snapshot)?;
        }

        log::debug!(
            "Monitoring stopped after {} frames with {} spikes in window",
            self.num_frames,
            self.aggregator.len()
        );
        Ok(())
    }
}
