//! Rate-based Poisson encoding of intensity fields into spike trains.
//!
//! Every unit of the field is an independent Poisson source whose rate is proportional to its intensity.
//!
//! # Examples
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use snn_accelerator::encoder::{intensity_field, PoissonEncoder};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let field = intensity_field(&[vec![0.0, 255.0], vec![128.0, 0.0]]).unwrap();
//! let encoder = PoissonEncoder::build(0.1, 100.0).unwrap();
//! let spike_train = encoder.encode(&field, &mut rng);
//!
//! // Units 0 and 3 have zero intensity and never appear
//! assert!(spike_train.get(0).is_none());
//! assert!(spike_train.get(3).is_none());
//! ```
use nalgebra::DMatrix;
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Poisson;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::SNNError;
use super::spike_train::SpikeTrain;
use super::MAX_INTENSITY;

/// Builds a 2-D intensity field from its rows.
/// The function returns an error if the rows do not all have the same length.
pub fn intensity_field(rows: &[Vec<f64>]) -> Result<DMatrix<f64>, SNNError> {
    let ncols = rows.first().map_or(0, |row| row.len());
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != ncols) {
        return Err(SNNError::InvalidArgument(format!(
            "Intensity field is not rectangular: row {} has {} values, expected {}",
            i,
            row.len(),
            ncols
        )));
    }

    let data: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(rows.len(), ncols, &data))
}

/// A rate-based Poisson encoder.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct PoissonEncoder {
    /// Length of the encoding window.
    duration: f64,
    /// Firing rate of a unit at full intensity.
    max_rate: f64,
}

impl PoissonEncoder {
    /// Create a new encoder with the specified parameters.
    /// Returns an error if the duration or the maximum rate is not positive.
    pub fn build(duration: f64, max_rate: f64) -> Result<Self, SNNError> {
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(SNNError::InvalidArgument(
                "Encoding duration must be positive and finite".to_string(),
            ));
        }

        if !(max_rate > 0.0 && max_rate.is_finite()) {
            return Err(SNNError::InvalidArgument(
                "Maximum firing rate must be positive and finite".to_string(),
            ));
        }

        Ok(PoissonEncoder { duration, max_rate })
    }

    /// Returns the length of the encoding window.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns the firing rate at full intensity.
    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    /// Returns the expected number of spikes of a unit with the given intensity.
    pub fn expected_num_spikes(&self, intensity: f64) -> f64 {
        if intensity > 0.0 {
            intensity / MAX_INTENSITY * self.max_rate * self.duration
        } else {
            0.0
        }
    }

    /// Encodes an intensity field into a spike train.
    ///
    /// Units are indexed in row-major scan order, i.e., `row * ncols + col`.
    /// Units with non-positive intensity are omitted from the result.
    /// Intensities are expected in `[0, 255]` and are not clamped.
    pub fn encode<R: Rng + ?Sized>(&self, field: &DMatrix<f64>, rng: &mut R) -> SpikeTrain {
        let mut spike_train = SpikeTrain::new_empty(self.duration);
        let uniform = Uniform::new(0.0, self.duration);

        let ncols = field.ncols();
        for row in 0..field.nrows() {
            for col in 0..ncols {
                let intensity = field[(row, col)];
                if !(intensity > 0.0) {
                    continue;
                }

                let mean_num_spikes = self.expected_num_spikes(intensity);
                if !mean_num_spikes.is_finite() {
                    log::warn!(
                        "Skipping unit {} with intensity {}: infinite spike rate",
                        row * ncols + col,
                        intensity
                    );
                    continue;
                }

                let num_spikes = match Poisson::new(mean_num_spikes) {
                    Ok(poisson) => poisson.sample(rng) as usize,
                    Err(e) => {
                        log::warn!(
                            "Skipping unit {} with intensity {}: {}",
                            row * ncols + col,
                            intensity,
                            e
                        );
                        continue;
                    }
                };

                if num_spikes == 0 {
                    continue;
                }

                let mut times: Vec<f64> = (0..num_spikes).map(|_| uniform.sample(rng)).collect();
                times.sort_by(f64::total_cmp);
                spike_train.insert_sorted(row * ncols + col, times);
            }
        }

        log::trace!(
            "{} spikes sampled over {} active units (field of {}x{})",
            spike_train.num_spikes(),
            spike_train.num_units(),
            field.nrows(),
            ncols
        );

        spike_train
    }

    /// Encodes a batch of intensity fields in parallel.
    /// The i-th field is encoded with its own generator seeded with `seed + i`, so the result does not depend on scheduling.
    pub fn encode_batch(&self, fields: &[DMatrix<f64>], seed: u64) -> Vec<SpikeTrain> {
        fields
            .par_iter()
            .enumerate()
            .map(|(i, field)| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
                self.encode(field, &mut rng)
            })
            .collect()
    }
}

/// Encodes an intensity field into a spike train, see [`PoissonEncoder::encode`].
/// Returns an error if the duration or the maximum rate is not positive.
pub fn encode<R: Rng + ?Sized>(
    field: &DMatrix<f64>,
    duration: f64,
    max_rate: f64,
    rng: &mut R,
) -> Result<SpikeTrain, SNNError> {
    let encoder = PoissonEncoder::build(duration, max_rate)?;
    Ok(encoder.encode(field, rng))
}
