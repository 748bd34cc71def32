// Bounded FIFO history of samples
use super::sample::Sample;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl HistoryBuffer {
    /// Create a buffer holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, returning the evicted oldest sample when full.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn oldest_first(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.samples.iter()
    }

    pub fn newest_first(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.samples.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::{Severity, TheftRule};
    use chrono::Utc;

    fn sample(n: usize) -> Sample {
        Sample::classified(
            format!("id-{}", n),
            Utc::now(),
            0.2,
            0.19,
            "MTR-100".to_string(),
            &TheftRule::default(),
            Severity::High,
        )
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = HistoryBuffer::new(3);
        for n in 0..10 {
            buffer.push(sample(n));
            assert!(buffer.len() <= 3);
        }
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut buffer = HistoryBuffer::new(24);
        for n in 0..24 {
            assert!(buffer.push(sample(n)).is_none());
        }

        let evicted = buffer.push(sample(24)).unwrap();
        assert_eq!(evicted.id(), "id-0");
        assert!(buffer.oldest_first().all(|s| s.id() != "id-0"));
        assert_eq!(buffer.newest().unwrap().id(), "id-24");
        assert_eq!(buffer.oldest_first().next().unwrap().id(), "id-1");
    }

    #[test]
    fn test_iteration_orders() {
        let mut buffer = HistoryBuffer::new(5);
        for n in 0..3 {
            buffer.push(sample(n));
        }
        let oldest: Vec<&str> = buffer.oldest_first().map(|s| s.id()).collect();
        let newest: Vec<&str> = buffer.newest_first().map(|s| s.id()).collect();
        assert_eq!(oldest, vec!["id-0", "id-1", "id-2"]);
        assert_eq!(newest, vec!["id-2", "id-1", "id-0"]);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut buffer = HistoryBuffer::new(0);
        buffer.push(sample(0));
        buffer.push(sample(1));
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.newest().unwrap().id(), "id-1");
    }
}
