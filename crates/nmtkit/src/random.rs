//! # Seeded Random Numbers
//!
//! [`Random`] wraps a 32-bit Mersenne Twister (MT19937) and draws
//! bias-free integers by rejection sampling against the generator's
//! full 32-bit output range.
//!
//! A nonzero seed gives bit-for-bit reproducible output;
//! a zero seed draws the real seed from system entropy.

use rand_mt::Mt;

/// The size of the generator's output range, `2^32`.
const GENERATOR_RANGE: u64 = 1 << 32;

/// Seeded uniform integer/float generator.
#[derive(Clone)]
pub struct Random {
    generator: Mt,
}

impl core::fmt::Debug for Random {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("Random").finish_non_exhaustive()
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Random {
    /// Create a new generator.
    ///
    /// ## Arguments
    /// * `seed` - the seed; `0` selects a non-deterministic entropy seed.
    pub fn new(seed: u32) -> Self {
        Self {
            generator: Mt::new(Self::resolve_seed(seed)),
        }
    }

    fn resolve_seed(seed: u32) -> u32 {
        if seed == 0 {
            rand::random::<u32>()
        } else {
            seed
        }
    }

    /// Reseed the underlying generator.
    ///
    /// ## Arguments
    /// * `seed` - the new seed; `0` selects a non-deterministic entropy seed.
    pub fn reset(
        &mut self,
        seed: u32,
    ) {
        self.generator = Mt::new(Self::resolve_seed(seed));
    }

    /// Draw one raw 32-bit value.
    #[inline(always)]
    fn next_raw(&mut self) -> u64 {
        self.generator.next_u32() as u64
    }

    /// Draw an integer uniformly from ``[min, max)``.
    ///
    /// Draws falling into the incomplete last bucket of the generator range
    /// are rejected, so the result has no modulo bias.
    ///
    /// ## Panics
    /// If `min >= max`, or if the range is wider than `2^32`.
    pub fn uniform(
        &mut self,
        min: i64,
        max: i64,
    ) -> i64 {
        assert!(min < max, "uniform: min ({min}) must be < max ({max})");
        let range = max.abs_diff(min);
        assert!(
            range <= GENERATOR_RANGE,
            "uniform: range ({range}) exceeds the generator range"
        );

        let limit = GENERATOR_RANGE - GENERATOR_RANGE % range;
        loop {
            let x = self.next_raw();
            if x < limit {
                return min + (x % range) as i64;
            }
        }
    }

    /// Draw an index uniformly from ``[min, max)``.
    ///
    /// ## Panics
    /// See [`Random::uniform`].
    pub fn uniform_index(
        &mut self,
        min: usize,
        max: usize,
    ) -> usize {
        self.uniform(min as i64, max as i64) as usize
    }

    /// Draw a float from ``[min, max)`` by scaling a single draw.
    pub fn funiform(
        &mut self,
        min: f64,
        max: f64,
    ) -> f64 {
        let unit = self.next_raw() as f64 / GENERATOR_RANGE as f64;
        min + (max - min) * unit
    }
}
