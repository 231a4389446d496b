//! Absolute follower counts to orb-spawning deltas

use serde::{Deserialize, Serialize};

use super::state::FollowerEvent;
use crate::error::RevealError;

/// Remembers the last reported follower count so each new daily count can be
/// turned into a growth event. The first report counts from zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowerTracker {
    last_count: Option<u64>,
}

impl FollowerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously stored count
    pub fn with_last_count(count: u64) -> Self {
        Self {
            last_count: Some(count),
        }
    }

    pub fn last_count(&self) -> Option<u64> {
        self.last_count
    }

    /// Record today's absolute count and return the growth event.
    ///
    /// A count lower than the previous one is rejected and leaves the tracker
    /// unchanged.
    pub fn record(&mut self, count: u64, timestamp: f64) -> Result<FollowerEvent, RevealError> {
        let previous = self.last_count.unwrap_or(0);
        if count < previous {
            return Err(RevealError::FollowerCountDecreased { previous, current: count });
        }

        self.last_count = Some(count);
        let delta = i64::try_from(count - previous).unwrap_or(i64::MAX);
        Ok(FollowerEvent { delta, timestamp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_day_counts_from_zero() {
        let mut tracker = FollowerTracker::new();
        let event = tracker.record(120, 1.0).unwrap();
        assert_eq!(event.delta, 120);
        assert_eq!(tracker.last_count(), Some(120));
    }

    #[test]
    fn test_deltas_between_days() {
        let mut tracker = FollowerTracker::new();
        tracker.record(100, 1.0).unwrap();
        assert_eq!(tracker.record(130, 2.0).unwrap().delta, 30);
        assert_eq!(tracker.record(130, 3.0).unwrap().delta, 0);
    }

    #[test]
    fn test_decrease_rejected() {
        let mut tracker = FollowerTracker::with_last_count(50);
        let err = tracker.record(40, 1.0).unwrap_err();
        assert_eq!(err, RevealError::FollowerCountDecreased { previous: 50, current: 40 });
        assert_eq!(tracker.last_count(), Some(50));
    }
}
