// Derived from asciinema (https://github.com/asciinema/asciinema)
// Copyright (c) asciinema authors
// Licensed under GPL-3.0-or-later

/// Error-diffusion quantizer (Bresenham style): rounds each value to a
/// multiple of `q` while keeping the accumulated rounding error under `q / 2`.
pub struct Quantizer {
    q: i128,
    error: i128,
}

impl Quantizer {
    pub fn new(q: u128) -> Self {
        Quantizer {
            q: q.max(1) as i128,
            error: 0,
        }
    }

    pub fn next(&mut self, value: u128) -> u128 {
        let error_corrected_value = value as i128 + self.error;
        let steps = (error_corrected_value + self.q / 2) / self.q;
        let quantized_value = steps * self.q;

        self.error = error_corrected_value - quantized_value;
        debug_assert!((self.error).abs() <= self.q / 2);

        quantized_value as u128
    }
}

#[cfg(test)]
mod tests {
    use super::Quantizer;

    #[test]
    fn frame_intervals_round_to_millis_without_drift() {
        // 30 fps: 33_333us per frame
        let mut quantizer = Quantizer::new(1_000);
        let quantized: Vec<u128> = (0..30).map(|_| quantizer.next(33_333)).collect();
        assert!(quantized.iter().all(|&q| q == 33_000 || q == 34_000));
        let total: u128 = quantized.iter().sum();
        assert!((total as i128 - 999_990).abs() <= 500, "{total}");
    }

    #[test]
    fn exact_multiples_pass_through() {
        let mut quantizer = Quantizer::new(1_000);
        assert_eq!(quantizer.next(100_000), 100_000);
        assert_eq!(quantizer.next(2_000), 2_000);
    }
}
