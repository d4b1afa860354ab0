//! Per-client sequence numbers.

use std::sync::atomic::{AtomicU8, Ordering};

/// Wrapping counter stamped into the addressing header of every request.
///
/// Starts at 0 and increments before handing out a value, so the first
/// allocation is 1 and the 256th wraps back to 0.
#[derive(Debug, Default)]
pub struct SequenceAllocator {
    counter: AtomicU8,
}

impl SequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u8 {
        self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// The most recently allocated value.
    pub fn current(&self) -> u8 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_first_values() {
        let sequence = SequenceAllocator::new();
        assert_eq!(sequence.next(), 1);
        assert_eq!(sequence.next(), 2);
        assert_eq!(sequence.current(), 2);
    }

    #[test]
    fn test_wraps_after_255() {
        let sequence = SequenceAllocator::new();
        for expected in 1..=255u8 {
            assert_eq!(sequence.next(), expected);
        }
        assert_eq!(sequence.next(), 0);
        assert_eq!(sequence.next(), 1);
    }

    #[test]
    fn test_concurrent_allocations_are_distinct() {
        let sequence = Arc::new(SequenceAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sequence = Arc::clone(&sequence);
                std::thread::spawn(move || (0..64).map(|_| sequence.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value), "duplicate sequence {value}");
            }
        }
        assert_eq!(seen.len(), 256);
    }
}
