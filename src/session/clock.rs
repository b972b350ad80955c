//! Frame clock
//!
//! Converts simulated delays into a whole number of frames. The computation
//! is integer-only: a delay of `ms` at `fps` frames per second spans
//! `ms * fps / 1000` frames, and the remainder is carried into the next call,
//! so a series of delays summing to `T` milliseconds always yields
//! `floor(T * fps / 1000)` frames no matter how it is split up.

/// Logical animation clock.
#[derive(Debug, Clone)]
pub struct FrameClock {
    fps: u64,
    /// Remainder in units of `ms * fps`, always `< 1000`
    carry: u64,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self {
            fps: u64::from(fps.max(1)),
            carry: 0,
        }
    }

    /// Number of whole frames elapsed after a delay of `ms`.
    pub fn tick(&mut self, ms: u64) -> usize {
        let total = self.carry + ms.saturating_mul(self.fps);
        self.carry = total % 1000;
        usize::try_from(total / 1000).unwrap_or(usize::MAX)
    }

    /// Duration of a single frame, rounded up to whole milliseconds.
    pub fn frame_ms(&self) -> u64 {
        1000_u64.div_ceil(self.fps)
    }
}
