/// HyperLogLog sketch for approximate distinct counting
///
/// Composite collectors fall back to this sketch when their exact tuple set
/// outgrows the configured threshold. At the default precision the register
/// array is 2KB, which is the per-combination budget the pass size knob
/// assumes.
use serde::{Deserialize, Serialize};

/// Default precision: 2^11 registers, about 2KB per sketch.
pub const DEFAULT_PRECISION: usize = 11;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HllSketch {
    precision: usize,
    registers: Vec<u8>,
}

impl HllSketch {
    /// Create a sketch with `2^precision` registers. Precision is clamped to
    /// the usable 4..=16 range.
    pub fn new(precision: usize) -> Self {
        let precision = precision.clamp(4, 16);
        Self {
            precision,
            registers: vec![0; 1 << precision],
        }
    }

    /// Record one hashed observation.
    pub fn add(&mut self, hash: u64) {
        let index = (hash & ((1u64 << self.precision) - 1)) as usize;
        let remaining = hash >> self.precision;
        // Rank: position of the first set bit in the remaining stream,
        // counting from 1. An all-zero remainder takes the maximum rank.
        let rank = if remaining == 0 {
            (64 - self.precision) as u8
        } else {
            remaining.trailing_zeros() as u8 + 1
        };
        if rank > self.registers[index] {
            self.registers[index] = rank;
        }
    }

    /// Approximate number of distinct observations.
    pub fn estimate(&self) -> f64 {
        let m = self.registers.len() as f64;
        let sum: f64 = self
            .registers
            .iter()
            .map(|&r| 2.0_f64.powi(-(r as i32)))
            .sum();
        let alpha = if m >= 128.0 {
            0.7213 / (1.0 + 1.079 / m)
        } else {
            0.673
        };
        let raw = alpha * m * m / sum;

        if raw < 2.5 * m {
            // Small-range correction via linear counting
            let zeros = self.registers.iter().filter(|&&r| r == 0).count() as f64;
            if zeros > 0.0 {
                return m * (m / zeros).ln();
            }
            raw
        } else if raw > (1u64 << 32) as f64 / 30.0 {
            // Large-range correction
            -((1u64 << 32) as f64) * (1.0 - raw / (1u64 << 32) as f64).ln()
        } else {
            raw
        }
    }
}

impl Default for HllSketch {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::{Hash, Hasher};

    fn hash_of(value: u64) -> u64 {
        let mut hasher = fxhash::FxHasher::default();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_empty_sketch_estimates_zero() {
        let sketch = HllSketch::default();
        assert!(sketch.estimate() < 1.0);
    }

    #[test]
    fn test_estimate_tracks_distinct_count() {
        let mut sketch = HllSketch::default();
        for i in 0..10_000u64 {
            sketch.add(hash_of(i));
        }
        // Duplicates must not move the estimate.
        for i in 0..10_000u64 {
            sketch.add(hash_of(i));
        }
        let estimate = sketch.estimate();
        assert!(
            estimate > 8_500.0 && estimate < 11_500.0,
            "estimate {} outside tolerance of 10000",
            estimate
        );
    }
}
