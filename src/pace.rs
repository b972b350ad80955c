//! Real-time pacing for the live preview.
//!
//! Pacing only decides how long the process sleeps between recorded
//! frames. It never influences which frames are recorded.

use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pace {
    /// Sleep for the simulated delay so a human can follow along
    Realtime,
    /// Record as fast as possible
    #[default]
    Instant,
}

impl Pace {
    pub fn sleep(self, ms: u64) {
        if self == Pace::Realtime && ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}
