//! Fixed-capacity FIFO buffer of the most recent spikes.
use super::error::SNNError;
use super::spike_train::Spike;

/// A ring buffer keeping the most recent spikes in arrival order.
///
/// The slots are filled once up to the capacity, then the oldest slot is overwritten in place.
#[derive(Debug, PartialEq, Clone)]
pub struct SpikeWindow {
    slots: Vec<Spike>,
    /// Index of the oldest spike in `slots`.
    head: usize,
    capacity: usize,
}

impl SpikeWindow {
    /// Create a new empty window with the specified capacity.
    /// Slots are allocated as spikes arrive, not upfront.
    /// Returns an error if the capacity is zero.
    pub fn build(capacity: usize) -> Result<Self, SNNError> {
        if capacity == 0 {
            return Err(SNNError::InvalidArgument(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(SpikeWindow {
            slots: Vec::new(),
            head: 0,
            capacity,
        })
    }

    /// Appends a spike, evicting the oldest one if the window is full.
    /// Returns the evicted spike, if any.
    pub fn push(&mut self, spike: Spike) -> Option<Spike> {
        if self.slots.len() < self.capacity {
            self.slots.push(spike);
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.head], spike);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Returns an iterator over the buffered spikes, from the oldest to the most recent.
    pub fn iter(&self) -> impl Iterator<Item = &Spike> + '_ {
        let (newest, oldest) = self.slots.split_at(self.head);
        oldest.iter().chain(newest.iter())
    }

    /// Removes all spikes, keeping the capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_build() {
        assert_eq!(
            SpikeWindow::build(0),
            Err(SNNError::InvalidArgument(
                "Window size must be positive".to_string()
            ))
        );

        let window = SpikeWindow::build(4).unwrap();
        assert_eq!(window.capacity(), 4);
        assert!(window.is_empty());
        assert_eq!(window.iter().count(), 0);
    }

    #[test]
    fn test_window_large_capacity() {
        let mut window = SpikeWindow::build(usize::MAX).unwrap();
        assert_eq!(window.capacity(), usize::MAX);

        window.push(Spike::new(0, 1.0));
        window.push(Spike::new(1, 2.0));
        assert_eq!(window.len(), 2);
        assert!(!window.is_full());
    }

    #[test]
    fn test_window_push_and_evict() {
        let mut window = SpikeWindow::build(3).unwrap();

        assert_eq!(window.push(Spike::new(1, 0.0)), None);
        assert_eq!(window.push(Spike::new(2, 1.0)), None);
        assert_eq!(window.push(Spike::new(1, 2.0)), None);
        assert!(window.is_full());

        assert_eq!(window.push(Spike::new(3, 3.0)), Some(Spike::new(1, 0.0)));
        assert_eq!(window.push(Spike::new(2, 4.0)), Some(Spike::new(2, 1.0)));
        assert_eq!(window.len(), 3);
        assert_eq!(
            window.iter().copied().collect::<Vec<_>>(),
            vec![Spike::new(1, 2.0), Spike::new(3, 3.0), Spike::new(2, 4.0)]
        );
    }

    #[test]
    fn test_window_wraps_many_times() {
        let mut window = SpikeWindow::build(7).unwrap();
        for k in 0..100 {
            window.push(Spike::new(k, k as f64));
            assert_eq!(window.len(), (k + 1).min(7));
        }

        let unit_ids: Vec<usize> = window.iter().map(|spike| spike.unit_id()).collect();
        assert_eq!(unit_ids, (93..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_window_keeps_arrival_order() {
        let mut window = SpikeWindow::build(2).unwrap();
        window.push(Spike::new(0, 5.0));
        window.push(Spike::new(1, 1.0));
        assert_eq!(
            window.iter().map(|spike| spike.time()).collect::<Vec<_>>(),
            vec![5.0, 1.0]
        );

        window.clear();
        assert!(window.is_empty());
        window.push(Spike::new(4, 0.5));
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![Spike::new(4, 0.5)]);
    }
}
