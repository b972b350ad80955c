//! Typing rhythm.
//!
//! Per-keystroke delays are drawn from a seeded SplitMix64 generator so a
//! given seed always produces the same delays, and therefore the same
//! frames, on every platform.

use std::time::{SystemTime, UNIX_EPOCH};

/// Deterministic 64-bit generator (SplitMix64).
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `lo..=hi`.
    pub fn between(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        let span = hi - lo + 1;
        lo + self.next_u64() % span
    }
}

/// Delay source for `type` and `delete`.
#[derive(Debug, Clone)]
pub struct TypingRhythm {
    speed_ms: u64,
    seed: u64,
    rng: SplitMix64,
}

impl TypingRhythm {
    /// `seed == 0` picks a seed from the system clock.
    pub fn new(speed_ms: u64, seed: u64) -> Self {
        let seed = if seed == 0 { clock_seed() } else { seed };
        Self {
            speed_ms,
            seed,
            rng: SplitMix64::new(seed),
        }
    }

    /// The seed in use, so a run can be reproduced.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Delay after one typed character: uniform in `[speed, 2 * speed]`.
    pub fn keystroke(&mut self) -> u64 {
        self.rng.between(self.speed_ms, self.speed_ms.saturating_mul(2))
    }

    /// Delay after one deleted character: three times faster than typing.
    pub fn backspace(&mut self) -> u64 {
        let speed = self.speed_ms / 3;
        self.rng.between(speed, speed * 2)
    }
}

fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED);
    nanos.max(1)
}
