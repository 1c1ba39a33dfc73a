//! Summary statistics of a recorded spike sequence.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::spike_train::Spike;

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct SpikeStatistics {
    /// Total number of spikes.
    pub total_spikes: usize,
    /// Number of distinct units that fired.
    pub active_units: usize,
    /// Earliest spike time, if any.
    pub first_time: Option<f64>,
    /// Latest spike time, if any.
    pub last_time: Option<f64>,
}

impl SpikeStatistics {
    /// Computes the statistics of a spike sequence (in any order).
    pub fn from_spikes(spikes: &[Spike]) -> Self {
        let times = spikes.iter().map(|spike| spike.time());
        SpikeStatistics {
            total_spikes: spikes.len(),
            active_units: spikes.iter().map(|spike| spike.unit_id()).unique().count(),
            first_time: times.clone().min_by(f64::total_cmp),
            last_time: times.max_by(f64::total_cmp),
        }
    }

    /// Returns the mean number of spikes per active unit.
    pub fn mean_spikes_per_unit(&self) -> f64 {
        if self.active_units == 0 {
            0.0
        } else {
            self.total_spikes as f64 / self.active_units as f64
        }
    }
}
