//! Module implementing the concepts of spike and spike train.
use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::error::SNNError;
use super::MICROS_PER_MILLI;

/// A spike emitted by a unit at a given time.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Spike {
    /// The ID of the unit producing the spike.
    unit_id: usize,
    /// The time at which the spike is produced.
    time: f64,
}

impl Spike {
    /// Create a new spike with the specified parameters.
    pub fn new(unit_id: usize, time: f64) -> Self {
        Spike { unit_id, time }
    }

    /// Returns the ID of the unit producing the spike.
    pub fn unit_id(&self) -> usize {
        self.unit_id
    }

    /// Returns the time at which the spike is produced.
    pub fn time(&self) -> f64 {
        self.time
    }
}

/// Spikes are ordered by time only.
impl PartialOrd for Spike {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.time.partial_cmp(&other.time)
    }
}

/// Converts a hardware timestamp in microseconds to milliseconds.
pub fn micros_to_millis(time: f64) -> f64 {
    time / MICROS_PER_MILLI
}

/// Returns the spikes whose unit falls in the given range, with units re-indexed relative to the range start.
pub fn spikes_in_range(spikes: &[Spike], units: Range<usize>) -> Vec<Spike> {
    spikes
        .iter()
        .filter(|spike| units.contains(&spike.unit_id))
        .map(|spike| Spike::new(spike.unit_id - units.start, spike.time))
        .collect()
}

/// A multi-unit spike train over the window `[0, duration)`.
///
/// Only units with at least one spike are present: a missing unit means no spikes, not an error.
/// The firing times of every unit are sorted in ascending order.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(try_from = "SpikeTrainData")]
pub struct SpikeTrain {
    spike_train: BTreeMap<usize, Vec<f64>>,
    duration: f64,
}

/// Unchecked serialized form of a spike train, validated by [`SpikeTrain::build`].
#[derive(Deserialize)]
struct SpikeTrainData {
    spike_train: BTreeMap<usize, Vec<f64>>,
    duration: f64,
}

impl TryFrom<SpikeTrainData> for SpikeTrain {
    type Error = SNNError;

    fn try_from(data: SpikeTrainData) -> Result<Self, Self::Error> {
        SpikeTrain::build(data.spike_train, data.duration)
    }
}

impl SpikeTrain {
    /// Creates a new empty spike train over the window `[0, duration)`.
    pub fn new_empty(duration: f64) -> Self {
        SpikeTrain {
            spike_train: BTreeMap::new(),
            duration,
        }
    }

    /// Create a spike train from per-unit firing times.
    /// The firing times are sorted and units without firing times are dropped.
    /// The function returns an error for a non-positive or infinite duration, or for firing times outside `[0, duration)`.
    pub fn build(spike_train: BTreeMap<usize, Vec<f64>>, duration: f64) -> Result<Self, SNNError> {
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(SNNError::InvalidArgument(
                "Spike train duration must be positive and finite".to_string(),
            ));
        }

        let mut new_spike_train = BTreeMap::new();
        for (unit_id, mut times) in spike_train {
            if let Some(t) = times.iter().find(|t| !(**t >= 0.0 && **t < duration)) {
                return Err(SNNError::InvalidArgument(format!(
                    "Firing time {} of unit {} is outside [0, {})",
                    t, unit_id, duration
                )));
            }
            if times.is_empty() {
                continue;
            }
            times.sort_by(f64::total_cmp);
            new_spike_train.insert(unit_id, times);
        }

        Ok(SpikeTrain {
            spike_train: new_spike_train,
            duration,
        })
    }

    /// Inserts the sorted firing times of a unit. Empty firing times are ignored.
    pub(crate) fn insert_sorted(&mut self, unit_id: usize, times: Vec<f64>) {
        if !times.is_empty() {
            self.spike_train.insert(unit_id, times);
        }
    }

    /// Returns the firing times of a unit, if it fired at least once.
    pub fn get(&self, unit_id: usize) -> Option<&[f64]> {
        self.spike_train.get(&unit_id).map(|times| &times[..])
    }

    /// Returns the duration of the encoding window.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns the IDs of the units that fired, in ascending order.
    pub fn units(&self) -> impl Iterator<Item = usize> + '_ {
        self.spike_train.keys().copied()
    }

    /// Returns the number of units that fired.
    pub fn num_units(&self) -> usize {
        self.spike_train.len()
    }

    /// Returns the total number of spikes.
    pub fn num_spikes(&self) -> usize {
        self.spike_train.values().map(|times| times.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spike_train.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64])> + '_ {
        self.spike_train
            .iter()
            .map(|(unit_id, times)| (*unit_id, &times[..]))
    }

    /// Returns all spikes as a single sequence sorted by time (ties broken by unit ID).
    pub fn flatten(&self) -> Vec<Spike> {
        let mut spikes: Vec<Spike> = self
            .spike_train
            .iter()
            .flat_map(|(unit_id, times)| times.iter().map(move |t| Spike::new(*unit_id, *t)))
            .collect();
        spikes.sort_by(|spike_1, spike_2| spike_1.time.total_cmp(&spike_2.time));
        spikes
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_spike_train_build() {
        // Test unsorted firing times and empty units
        let spike_train = SpikeTrain::build(
            BTreeMap::from([(3, vec![0.5, 0.1]), (1, vec![]), (0, vec![0.2])]),
            1.0,
        )
        .unwrap();
        assert_eq!(spike_train.get(3), Some(&[0.1, 0.5][..]));
        assert_eq!(spike_train.get(1), None);
        assert_eq!(spike_train.units().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(spike_train.num_spikes(), 3);

        // Test invalid duration
        assert_eq!(
            SpikeTrain::build(BTreeMap::new(), 0.0),
            Err(SNNError::InvalidArgument(
                "Spike train duration must be positive and finite".to_string()
            ))
        );

        // Test firing time at the (excluded) end of the window
        assert!(matches!(
            SpikeTrain::build(BTreeMap::from([(0, vec![0.0, 1.0])]), 1.0),
            Err(SNNError::InvalidArgument(_))
        ));

        // Test NaN firing time
        assert!(matches!(
            SpikeTrain::build(BTreeMap::from([(0, vec![f64::NAN])]), 1.0),
            Err(SNNError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_spike_train_deserialize() {
        let spike_train = SpikeTrain::build(BTreeMap::from([(2, vec![0.25, 0.05])]), 0.5).unwrap();
        let json = serde_json::to_string(&spike_train).unwrap();
        assert_eq!(json, r#"{"spike_train":{"2":[0.05,0.25]},"duration":0.5}"#);
        assert_eq!(serde_json::from_str::<SpikeTrain>(&json).unwrap(), spike_train);

        // Deserialization sorts firing times and drops empty units like `build`
        let spike_train: SpikeTrain =
            serde_json::from_str(r#"{"spike_train":{"0":[0.3,0.1],"4":[]},"duration":0.5}"#)
                .unwrap();
        assert_eq!(spike_train.get(0), Some(&[0.1, 0.3][..]));
        assert_eq!(spike_train.get(4), None);

        // Firing times outside the window are rejected
        let result = serde_json::from_str::<SpikeTrain>(
            r#"{"spike_train":{"0":[0.1,0.7]},"duration":0.5}"#,
        );
        assert!(result.unwrap_err().to_string().contains("outside [0, 0.5)"));

        // Non-positive durations are rejected
        let result = serde_json::from_str::<SpikeTrain>(r#"{"spike_train":{},"duration":0.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_spike_train_flatten() {
        let spike_train = SpikeTrain::build(
            BTreeMap::from([(0, vec![0.3, 0.1]), (7, vec![0.2, 0.05])]),
            0.5,
        )
        .unwrap();

        let spikes = spike_train.flatten();
        assert_eq!(
            spikes,
            vec![
                Spike::new(7, 0.05),
                Spike::new(0, 0.1),
                Spike::new(7, 0.2),
                Spike::new(0, 0.3)
            ]
        );
        assert!(spikes.iter().tuple_windows().all(|(s1, s2)| s1 <= s2));

        assert!(SpikeTrain::new_empty(1.0).flatten().is_empty());
    }

    #[test]
    fn test_micros_to_millis() {
        assert_eq!(micros_to_millis(0.0), 0.0);
        assert_eq!(micros_to_millis(1500.0), 1.5);
    }

    #[test]
    fn test_spikes_in_range() {
        let spikes = vec![
            Spike::new(10, 1.0),
            Spike::new(884, 2.0),
            Spike::new(893, 3.0),
            Spike::new(894, 4.0),
        ];
        assert_eq!(
            spikes_in_range(&spikes, 884..894),
            vec![Spike::new(0, 2.0), Spike::new(9, 3.0)]
        );
        assert!(spikes_in_range(&spikes, 0..5).is_empty());
    }
}
