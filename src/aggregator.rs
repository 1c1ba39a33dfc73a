//! Sliding-window aggregation of a live spike stream.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use snn_accelerator::aggregator::SpikeWindowAggregator;
//! use snn_accelerator::spike_train::Spike;
//!
//! let mut aggregator = SpikeWindowAggregator::build(3).unwrap();
//! for (k, unit_id) in [1, 2, 1, 3, 2].into_iter().enumerate() {
//!     aggregator.ingest(Spike::new(unit_id, k as f64));
//! }
//!
//! let (times, unit_ids) = aggregator.raster_view();
//! assert_eq!(times, vec![2.0, 3.0, 4.0]);
//! assert_eq!(unit_ids, vec![1, 3, 2]);
//! assert_eq!(aggregator.distribution_view(), BTreeMap::from([(1, 1), (2, 1), (3, 1)]));
//! ```
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::error::SNNError;
use super::spike_train::Spike;
use super::window::SpikeWindow;

/// A consistent view of the window: the raster and the per-unit spike counts.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Spike times, in arrival order.
    pub times: Vec<f64>,
    /// Spike unit IDs, index-aligned with `times`.
    pub unit_ids: Vec<usize>,
    /// Number of spikes of every unit present in the window.
    pub counts: BTreeMap<usize, usize>,
}

impl Snapshot {
    pub fn num_spikes(&self) -> usize {
        self.times.len()
    }

    /// Serializes the snapshot to JSON, e.g., for a remote renderer.
    pub fn to_json(&self) -> Result<String, SNNError> {
        serde_json::to_string(self).map_err(|e| SNNError::ParseError(e.to_string()))
    }
}

/// Keeps the most recent spikes of a stream and projects them as a raster and a count distribution.
#[derive(Debug, PartialEq, Clone)]
pub struct SpikeWindowAggregator {
    window: SpikeWindow,
}

impl SpikeWindowAggregator {
    /// Create a new aggregator over a window of the specified size.
    /// Returns an error if the window size is zero.
    pub fn build(window_size: usize) -> Result<Self, SNNError> {
        Ok(SpikeWindowAggregator {
            window: SpikeWindow::build(window_size)?,
        })
    }

    /// Returns the (fixed) window size.
    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    /// Returns the number of spikes currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Appends a spike to the window, evicting the oldest one if the window is full.
    /// The spike is neither validated nor reordered.
    pub fn ingest(&mut self, spike: Spike) {
        self.window.push(spike);
    }

    /// Ingests every spike of the iterator, in order.
    pub fn ingest_all<I: IntoIterator<Item = Spike>>(&mut self, spikes: I) {
        spikes.into_iter().for_each(|spike| self.ingest(spike));
    }

    /// Returns the times and unit IDs of the buffered spikes, in arrival order.
    pub fn raster_view(&self) -> (Vec<f64>, Vec<usize>) {
        self.window
            .iter()
            .map(|spike| (spike.time(), spike.unit_id()))
            .unzip()
    }

    /// Returns the number of buffered spikes of every unit present in the window.
    pub fn distribution_view(&self) -> BTreeMap<usize, usize> {
        self.window
            .iter()
            .map(|spike| spike.unit_id())
            .counts()
            .into_iter()
            .collect()
    }

    /// Returns both views at once.
    pub fn snapshot(&self) -> Snapshot {
        let (times, unit_ids) = self.raster_view();
        Snapshot {
            times,
            unit_ids,
            counts: self.distribution_view(),
        }
    }
}

/// A thread-safe aggregator for concurrent producers.
///
/// Ingestion and views are serialized by a single lock, so a snapshot never interleaves with an eviction.
#[derive(Debug, Clone)]
pub struct SharedAggregator {
    inner: Arc<Mutex<SpikeWindowAggregator>>,
}

impl SharedAggregator {
    /// Create a new shared aggregator over a window of the specified size.
    pub fn build(window_size: usize) -> Result<Self, SNNError> {
        Ok(SharedAggregator {
            inner: Arc::new(Mutex::new(SpikeWindowAggregator::build(window_size)?)),
        })
    }

    // Ingestion cannot leave the window half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, SpikeWindowAggregator> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ingest(&self, spike: Spike) {
        self.lock().ingest(spike);
    }

    /// Ingests a batch of spikes under a single lock acquisition.
    pub fn ingest_all<I: IntoIterator<Item = Spike>>(&self, spikes: I) {
        self.lock().ingest_all(spikes);
    }

    pub fn raster_view(&self) -> (Vec<f64>, Vec<usize>) {
        self.lock().raster_view()
    }

    pub fn distribution_view(&self) -> BTreeMap<usize, usize> {
        self.lock().distribution_view()
    }

    /// Returns both views computed under the same lock.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_aggregator_build() {
        assert_eq!(
            SpikeWindowAggregator::build(0),
            Err(SNNError::InvalidArgument(
                "Window size must be positive".to_string()
            ))
        );
        assert!(SharedAggregator::build(0).is_err());

        let aggregator = SpikeWindowAggregator::build(10).unwrap();
        assert_eq!(aggregator.window_size(), 10);
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.raster_view(), (vec![], vec![]));
        assert!(aggregator.distribution_view().is_empty());
    }

    #[test]
    fn test_aggregator_scenario() {
        let mut aggregator = SpikeWindowAggregator::build(3).unwrap();
        aggregator.ingest_all(
            [1, 2, 1, 3, 2]
                .into_iter()
                .enumerate()
                .map(|(k, unit_id)| Spike::new(unit_id, 10.0 * k as f64)),
        );

        let (times, unit_ids) = aggregator.raster_view();
        assert_eq!(unit_ids, vec![1, 3, 2]);
        assert_eq!(times, vec![20.0, 30.0, 40.0]);
        assert_eq!(
            aggregator.distribution_view(),
            BTreeMap::from([(1, 1), (3, 1), (2, 1)])
        );
    }

    #[test]
    fn test_aggregator_len_and_counts() {
        let window_size = 50;
        let mut aggregator = SpikeWindowAggregator::build(window_size).unwrap();

        for k in 0..200 {
            aggregator.ingest(Spike::new(k % 7, k as f64));
            let (times, unit_ids) = aggregator.raster_view();
            assert_eq!(times.len(), (k + 1).min(window_size));
            assert_eq!(unit_ids.len(), times.len());
            assert_eq!(
                aggregator.distribution_view().values().sum::<usize>(),
                times.len()
            );
        }
    }

    #[test]
    fn test_aggregator_fifo() {
        let window_size = 5;
        let k = 3;
        let spikes: Vec<Spike> = (0..window_size + k)
            .map(|i| Spike::new(i * 2, 100.0 - i as f64))
            .collect();

        let mut aggregator = SpikeWindowAggregator::build(window_size).unwrap();
        aggregator.ingest_all(spikes.iter().copied());

        let (times, unit_ids) = aggregator.raster_view();
        assert_eq!(
            unit_ids,
            spikes[k..].iter().map(|s| s.unit_id()).collect::<Vec<_>>()
        );
        // Arrival order is kept even though times are decreasing
        assert_eq!(times, spikes[k..].iter().map(|s| s.time()).collect::<Vec<_>>());
    }

    #[test]
    fn test_views_do_not_mutate() {
        let mut aggregator = SpikeWindowAggregator::build(4).unwrap();
        aggregator.ingest(Spike::new(3, 1.0));
        aggregator.ingest(Spike::new(3, 2.0));

        let before = aggregator.clone();
        let _ = aggregator.raster_view();
        let _ = aggregator.distribution_view();
        assert_eq!(aggregator, before);

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.num_spikes(), 2);
        assert_eq!(snapshot.counts, BTreeMap::from([(3, 2)]));
        assert_eq!(
            snapshot.to_json().unwrap(),
            r#"{"times":[1.0,2.0],"unit_ids":[3,3],"counts":{"3":2}}"#
        );
    }

    #[test]
    fn test_shared_aggregator_concurrent_ingest() {
        let aggregator = SharedAggregator::build(100).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|producer| {
                let aggregator = aggregator.clone();
                thread::spawn(move || {
                    for k in 0..250 {
                        aggregator.ingest(Spike::new(producer, k as f64));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = aggregator.snapshot();
        assert_eq!(aggregator.len(), 100);
        assert_eq!(snapshot.times.len(), 100);
        assert_eq!(snapshot.counts.values().sum::<usize>(), 100);
        assert!(snapshot.counts.keys().all(|unit_id| *unit_id < 4));
    }
}
