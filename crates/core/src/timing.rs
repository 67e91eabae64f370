//! Navigation-timing deltas reported with every event.

use serde::{Deserialize, Serialize};

/// Milestones of the page load, in milliseconds since the epoch, as the
/// host's navigation-timing source reports them. Milestones that have not
/// happened yet are reported as zero by browsers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    pub navigation_start: f64,
    pub response_start: f64,
    pub load_event_end: f64,
}

impl NavigationTiming {
    /// Time from navigation start to the end of the load event.
    pub fn load_time_ms(&self) -> u64 {
        elapsed_ms(self.navigation_start, self.load_event_end)
    }

    /// Time from navigation start to the first response byte.
    pub fn first_byte_ms(&self) -> u64 {
        elapsed_ms(self.navigation_start, self.response_start)
    }
}

/// Milliseconds between two timestamps, clamped to zero when the difference
/// is negative or not a finite number.
pub fn elapsed_ms(start: f64, end: f64) -> u64 {
    let delta = end - start;
    if !delta.is_finite() || delta <= 0.0 {
        return 0;
    }
    delta.round() as u64
}
