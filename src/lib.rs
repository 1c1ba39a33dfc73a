//! This crate provides the host-side tools of a spiking neural network (SNN) accelerator:
//! encoding of analog inputs into spike trains, and live telemetry of the spikes it emits.
//!
//! # Encoding Inputs
//!
//! ```rust
//! use snn_accelerator::encoder::encode;
//! use nalgebra::DMatrix;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! // A 28x28 image with a bright square in the middle
//! let image = DMatrix::from_fn(28, 28, |row, col| {
//!     if (10..18).contains(&row) && (10..18).contains(&col) { 255.0 } else { 0.0 }
//! });
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let spike_train = encode(&image, 0.1, 100.0, &mut rng).unwrap();
//!
//! // Dark pixels never fire
//! assert!(spike_train.units().all(|unit_id| (10..18).contains(&(unit_id / 28))));
//! ```
//!
//! # Monitoring Outputs
//!
//! ```rust
//! use snn_accelerator::aggregator::SpikeWindowAggregator;
//! use snn_accelerator::spike_train::Spike;
//!
//! // Keep the 1000 most recent spikes
//! let mut aggregator = SpikeWindowAggregator::build(1000).unwrap();
//! for k in 0..5000 {
//!     aggregator.ingest(Spike::new(k % 10, k as f64));
//! }
//!
//! let (times, unit_ids) = aggregator.raster_view();
//! assert_eq!(times.len(), 1000);
//! assert_eq!(unit_ids[0], 0);
//! assert!(aggregator.distribution_view().values().all(|count| *count == 100));
//! ```
//!
//! # Configuration
//!
//! Network and telemetry settings are read from `.json` or `.yaml` files, see [`config`].

pub mod aggregator;
pub mod config;
pub mod encoder;
pub mod error;
pub mod monitor;
pub mod spike_train;
pub mod stats;
pub mod window;

/// The intensity of a unit firing at the maximum rate.
pub const MAX_INTENSITY: f64 = 255.0;
/// The number of microseconds (hardware time unit) in a millisecond (display time unit).
pub const MICROS_PER_MILLI: f64 = 1000.0;
/// The default length of the encoding window.
pub const DEFAULT_DURATION: f64 = 0.1;
/// The default firing rate at full intensity.
pub const DEFAULT_MAX_RATE: f64 = 100.0;
/// The default number of spikes kept by the monitor.
pub const DEFAULT_WINDOW_SIZE: usize = 1000;
