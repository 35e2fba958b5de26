//! Edge tracker for starvation episodes.
//!
//! An episode is a maximal run of observations on which the starvation
//! condition holds. Hosts want one "detected" report when an episode begins
//! and one "resolved" report when it ends, not one per tick in between.

use tracing::{debug, trace};

/// Transition reported by [`StarvationTracker::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarvationEdge {
    /// The condition started holding. Report it and force progress.
    Detected,

    /// The condition stopped holding after a reported detection.
    Resolved,
}

/// Tracks whether a starvation episode is currently being reported.
///
/// Two sticky flags suppress duplicate reports:
///
/// 1. **detected**: set on the first observation of an episode, cleared on
///    the first observation after it ends.
///
/// 2. **resolution_reported**: set when the end of an episode is reported,
///    cleared when the next episode begins, so every episode yields at most
///    one resolution.
#[derive(Debug, Default)]
pub struct StarvationTracker {
    detected: bool,
    resolution_reported: bool,
    episodes: u64,
}

impl StarvationTracker {
    /// Create a new tracker with both flags clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation of the starvation condition.
    ///
    /// Returns the edge to report, if any.
    pub fn observe(&mut self, starved: bool) -> Option<StarvationEdge> {
        if starved {
            if self.detected {
                trace!(episode = self.episodes, "Starvation persists");
                return None;
            }
            self.detected = true;
            self.resolution_reported = false;
            self.episodes += 1;
            debug!(episode = self.episodes, "Starvation episode started");
            return Some(StarvationEdge::Detected);
        }

        let edge = if self.detected && !self.resolution_reported {
            self.resolution_reported = true;
            debug!(episode = self.episodes, "Starvation episode ended");
            Some(StarvationEdge::Resolved)
        } else {
            None
        };
        self.detected = false;
        edge
    }

    /// Whether an episode is currently in progress.
    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// Whether the most recent episode's resolution has been reported.
    pub fn resolution_reported(&self) -> bool {
        self.resolution_reported
    }

    /// Number of episodes detected since creation or the last reset.
    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    /// Clear both flags and the episode count.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_single_episode_reports_each_edge_once() {
        let mut tracker = StarvationTracker::new();

        assert_eq!(tracker.observe(true), Some(StarvationEdge::Detected));
        assert_eq!(tracker.observe(true), None);
        assert_eq!(tracker.observe(true), None);

        assert_eq!(tracker.observe(false), Some(StarvationEdge::Resolved));
        assert_eq!(tracker.observe(false), None);
        assert!(!tracker.is_detected());
        assert_eq!(tracker.episodes(), 1);
    }

    #[test]
    fn test_no_resolution_without_detection() {
        let mut tracker = StarvationTracker::new();
        assert_eq!(tracker.observe(false), None);
        assert_eq!(tracker.observe(false), None);
        assert_eq!(tracker.episodes(), 0);
    }

    #[test]
    fn test_each_episode_reports_its_own_resolution() {
        let mut tracker = StarvationTracker::new();

        for episode in 1..=3 {
            assert_eq!(tracker.observe(true), Some(StarvationEdge::Detected));
            assert!(!tracker.resolution_reported());
            assert_eq!(tracker.observe(false), Some(StarvationEdge::Resolved));
            assert!(tracker.resolution_reported());
            assert_eq!(tracker.episodes(), episode);
        }
    }

    #[test]
    fn test_reset_clears_flags() {
        let mut tracker = StarvationTracker::new();
        tracker.observe(true);
        tracker.reset();

        assert!(!tracker.is_detected());
        assert_eq!(tracker.episodes(), 0);
        // Fresh tracker: condition holding again is a new detection
        assert_eq!(tracker.observe(true), Some(StarvationEdge::Detected));
    }
}
