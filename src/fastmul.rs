//! Fixed-point multiplication of a 32-bit integer by a fraction in `[0, 1]`.
//!
//! The arithmetic coder computes interval boundaries as `⌊range · q⌋` in its
//! innermost loop. Scaling the fraction once into 32.32 fixed point turns
//! every boundary computation into a single 64-bit multiply and shift.

use crate::error::{Error, Result};

const SCALE_BITS: u32 = 32;

/// Multiplies `u32` values by a fixed fraction using 32.32 fixed-point
/// arithmetic.
pub struct FractionMultiplier {
    scaled_multiplier: u64,
}

impl FractionMultiplier {
    /// Create a multiplier for `fraction`.
    ///
    /// The stored multiplier is `⌊fraction · 2^32⌋`, saturated to
    /// `2^32 − 1` so it stays strictly below `2^32`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFraction`] unless `fraction ∈ [0.0, 1.0]`
    /// (NaN is rejected).
    pub fn new(fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::InvalidFraction(fraction));
        }
        let scaled = (fraction * (1u64 << SCALE_BITS) as f64) as u64;
        Ok(Self {
            scaled_multiplier: scaled.min((1u64 << SCALE_BITS) - 1),
        })
    }

    /// Compute `(x · scaled_multiplier) >> 32`.
    ///
    /// Approximates `⌊x · fraction⌋` to within one unit (never above it) and
    /// is monotonic in `x`.
    #[inline]
    pub fn multiply(&self, x: u32) -> u32 {
        ((u64::from(x) * self.scaled_multiplier) >> SCALE_BITS) as u32
    }
}
