//! Epoch boundaries in batch-index space.

use serde::{Deserialize, Serialize};

/// Exclusive end batch index of every completed epoch, strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochBoundaries(Vec<usize>);

impl EpochBoundaries {
    /// Create an empty boundary list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an epoch ending at `end` if it moved past the previous boundary.
    ///
    /// Returns whether the boundary was recorded.
    pub fn push(&mut self, end: usize) -> bool {
        if end <= self.last() {
            return false;
        }
        self.0.push(end);
        true
    }

    /// Most recent boundary, or 0 before the first one.
    pub fn last(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    /// Start of the epoch window that ends at `end`: the greatest boundary
    /// strictly below `end`, or 0.
    pub fn start_before(&self, end: usize) -> usize {
        self.0
            .iter()
            .rev()
            .find(|&&boundary| boundary < end)
            .copied()
            .unwrap_or(0)
    }

    /// `[start, end)` batch ranges of the recorded epochs.
    pub fn windows(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let starts = std::iter::once(0).chain(self.0.iter().copied());
        starts.zip(self.0.iter().copied())
    }

    /// Boundaries as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no epoch has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop all boundaries.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_strictly_increasing() {
        let mut epochs = EpochBoundaries::new();
        assert!(!epochs.push(0));
        assert!(epochs.push(3));
        assert!(!epochs.push(3));
        assert!(!epochs.push(2));
        assert!(epochs.push(6));
        assert_eq!(epochs.as_slice(), &[3, 6]);
        assert_eq!(epochs.last(), 6);
    }

    #[test]
    fn test_windows() {
        let mut epochs = EpochBoundaries::new();
        epochs.push(3);
        epochs.push(7);
        epochs.push(8);
        let windows: Vec<_> = epochs.windows().collect();
        assert_eq!(windows, vec![(0, 3), (3, 7), (7, 8)]);
    }

    #[test]
    fn test_start_before() {
        let mut epochs = EpochBoundaries::new();
        assert_eq!(epochs.start_before(5), 0);
        epochs.push(3);
        epochs.push(6);
        assert_eq!(epochs.start_before(6), 3);
        assert_eq!(epochs.start_before(9), 6);
        assert_eq!(epochs.start_before(3), 0);
    }
}
