//! Division of 31-bit unsigned integers by a precomputed magic multiplier.
//!
//! The rANS encoder divides its state by a symbol frequency on every step.
//! Precomputing a magic multiplier and shift for the fixed divisor replaces
//! the hardware divide with one 64-bit multiplication and one shift, after
//! "Hacker's Delight" (Henry S. Warren, Jr.), chapter 10.
//!
//! The quotient is exact for all numerators and divisors in `[0, 2^31)`.
//! Extending the scheme to the full 32-bit range would need an extra
//! correction step, and the coders never leave the 31-bit window.

use crate::error::{Error, Result};

/// Precomputed magic-number divider for a fixed 31-bit divisor.
#[derive(Clone, Copy, Debug)]
pub struct FastDiv31 {
    divisor: u32,
    multiplier: u64,
    shift_amount: u32,
}

impl FastDiv31 {
    /// Create a divider for `divisor`.
    ///
    /// A zero divisor is accepted as a defined-on-zero shim:
    /// [`divide`](Self::divide) returns 0 for every numerator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDivisor`] when `divisor ≥ 2^31`.
    pub fn new(divisor: u32) -> Result<Self> {
        if divisor >= 1 << 31 {
            return Err(Error::InvalidDivisor(divisor));
        }
        if divisor == 0 {
            return Ok(Self {
                divisor,
                multiplier: 0,
                shift_amount: 0,
            });
        }

        let divisor_bit_width = ceil_log2(divisor);
        let shift_amount = 32 + divisor_bit_width;
        // ⌈2^shift / divisor⌉; shift ≤ 63, so the sum stays inside u64.
        let multiplier = ((1u64 << shift_amount) + u64::from(divisor) - 1) / u64::from(divisor);

        Ok(Self {
            divisor,
            multiplier,
            shift_amount,
        })
    }

    /// Compute `⌊numerator / divisor⌋`.
    ///
    /// `numerator` must be below `2^31`.
    #[inline]
    pub fn divide(&self, numerator: u32) -> u32 {
        debug_assert!(numerator < 1 << 31);
        ((u64::from(numerator) * self.multiplier) >> self.shift_amount) as u32
    }

    /// Compute `(⌊numerator / divisor⌋, numerator mod divisor)`.
    ///
    /// `numerator` must be below `2^31`.
    #[inline]
    pub fn div_rem(&self, numerator: u32) -> (u32, u32) {
        let quotient = self.divide(numerator);
        let remainder = numerator - quotient * self.divisor;
        (quotient, remainder)
    }

    /// The divisor this divider was built for.
    pub fn divisor(&self) -> u32 {
        self.divisor
    }
}

/// Exponent of the closest power of two greater than or equal to `value`,
/// 0 when `value ≤ 1`.
fn ceil_log2(value: u32) -> u32 {
    if value <= 1 {
        return 0;
    }
    32 - (value - 1).leading_zeros()
}
