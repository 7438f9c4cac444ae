//! Binary arithmetic coder.
//!
//! Classic interval-subdivision entropy coding for a Bernoulli bit source
//! with a fixed, caller-supplied probability. The coder keeps a 32-bit
//! integer interval `[low, high)`, narrows it by the probability split for
//! each message bit, and rescales with the three canonical renormalizations:
//!
//! - **E1**: interval in the lower half, emit `0` and double.
//! - **E2**: interval in the upper half, emit `1`, shift down and double.
//! - **E3**: interval inside the middle half, where no bit can be decided
//!   yet; defer one "pending" bit, shift and double.
//!
//! Pending bits are emitted as the complement of the next decided bit. The
//! boundary between the `0` and `1` sub-intervals is computed with a
//! [`FractionMultiplier`], so the hot loop contains no floating-point work
//! and no division.
//!
//! The encoder emits no length header; the decoder must be told the original
//! message length through the size of its output view.

use crate::bits::{BitArray, OutputBitStream};
use crate::error::{Error, Result};
use crate::fastmul::FractionMultiplier;

/// Bit width of the integer range that maps the `[0.0, 1.0)` interval.
pub const TOTAL_RANGE_BIT_WIDTH: u32 = 32;

const LOWEST: u64 = 0;
const HIGHEST: u64 = (1u64 << TOTAL_RANGE_BIT_WIDTH) - 1;
const QUARTER_RANGE: u64 = 1u64 << (TOTAL_RANGE_BIT_WIDTH - 2);
const HALF_RANGE: u64 = 1u64 << (TOTAL_RANGE_BIT_WIDTH - 1);
const THREE_QUARTERS_RANGE: u64 = (1u64 << TOTAL_RANGE_BIT_WIDTH) - QUARTER_RANGE;

/// Probabilities are clipped into `[ε, 1 − ε]` so neither sub-interval can
/// collapse to zero width while the interval invariant holds.
const PROBABILITY_EPSILON: f64 = 1e-9;

/// Validate `probability_of_one` and fold the clipped probability of zero
/// into a fixed-point multiplier.
fn boundary_multiplier(probability_of_one: f64) -> Result<FractionMultiplier> {
    if !(0.0..=1.0).contains(&probability_of_one) {
        return Err(Error::InvalidProbability(probability_of_one));
    }
    let clipped = probability_of_one.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
    FractionMultiplier::new(1.0 - clipped)
}

/// Emit all pending bits with the given value.
fn drain_pending(sink: &mut OutputBitStream, pending_bit_count: &mut u64, bit: u8) {
    while *pending_bit_count > 0 {
        sink.write_bit(bit);
        *pending_bit_count -= 1;
    }
}

/// Encode the message bits of `input` into `sink`.
///
/// `probability_of_one` is the Bernoulli parameter of the source. No length
/// header is written; a decoder must independently know
/// `input.bit_length()`.
///
/// # Errors
///
/// Returns [`Error::InvalidProbability`] when `probability_of_one` is
/// outside `[0.0, 1.0]` or NaN. The sink is untouched on error.
pub fn encode(
    input: &BitArray<'_>,
    sink: &mut OutputBitStream,
    probability_of_one: f64,
) -> Result<()> {
    let multiplier = boundary_multiplier(probability_of_one)?;

    let mut low = LOWEST;
    let mut high = HIGHEST;
    let mut pending_bit_count: u64 = 0;

    for read_position in 0..input.bit_length() {
        let input_bit = input.read(read_position);

        // Narrow: split [low, high) at the boundary where the sub-interval
        // for 0 ends and the one for 1 begins.
        let boundary = low + u64::from(multiplier.multiply((high - low) as u32));
        if input_bit == 0 {
            high = boundary;
        } else {
            low = boundary;
        }

        loop {
            if high < HALF_RANGE {
                // E1: lower half resolved.
                sink.write_bit(0);
                drain_pending(sink, &mut pending_bit_count, 1);
                low *= 2;
                high *= 2;
            } else if low >= HALF_RANGE {
                // E2: upper half resolved.
                sink.write_bit(1);
                drain_pending(sink, &mut pending_bit_count, 0);
                low = (low - HALF_RANGE) * 2;
                high = (high - HALF_RANGE) * 2;
            } else if low >= QUARTER_RANGE && high < THREE_QUARTERS_RANGE {
                // E3: straddling the midpoint inside the middle half; the
                // decided bit is deferred until the straddle resolves.
                pending_bit_count += 1;
                low = (low - QUARTER_RANGE) * 2;
                high = (high - QUARTER_RANGE) * 2;
            } else {
                break;
            }
        }
        debug_assert!(low < high);
        debug_assert!(high - low >= QUARTER_RANGE);
    }

    // Finalize: one definitive bit pinpoints the final interval, and the
    // deferred bits compensate for it.
    pending_bit_count += 1;
    if low < QUARTER_RANGE {
        sink.write_bit(0);
        drain_pending(sink, &mut pending_bit_count, 1);
    } else {
        sink.write_bit(1);
        drain_pending(sink, &mut pending_bit_count, 0);
    }

    Ok(())
}

/// Decode `output.bit_length()` bits from `encoded` into `output`.
///
/// `encoded` holds the packed bits a matching [`encode`] produced, and
/// `output` must be pre-sized to the original message length.
///
/// # Errors
///
/// Returns [`Error::InvalidProbability`] when `probability_of_one` is
/// outside `[0.0, 1.0]` or NaN. The output view is untouched on error.
pub fn decode(
    encoded: &BitArray<'_>,
    output: &mut BitArray<'_>,
    probability_of_one: f64,
) -> Result<()> {
    let multiplier = boundary_multiplier(probability_of_one)?;

    let input_bit_length = encoded.bit_length();
    let mut low = LOWEST;
    let mut high = HIGHEST;
    let mut value = LOWEST;
    let mut read_position = 0;

    // Fill `value` MSB-first; a stream shorter than the range width is
    // shifted up so the missing trailing bits read as zeros.
    let initial_bit_count = input_bit_length.min(TOTAL_RANGE_BIT_WIDTH as usize);
    while read_position < initial_bit_count {
        value = (value << 1) | u64::from(encoded.read(read_position));
        read_position += 1;
    }
    value <<= TOTAL_RANGE_BIT_WIDTH as usize - initial_bit_count;

    for write_position in 0..output.bit_length() {
        let boundary = low + u64::from(multiplier.multiply((high - low) as u32));
        if value < boundary {
            output.write(write_position, 0);
            high = boundary;
        } else {
            // A value exactly on the boundary belongs to the 1 interval,
            // [boundary, high).
            output.write(write_position, 1);
            low = boundary;
        }

        // Renormalize, mirroring the encoder's shifts onto `value` and
        // pulling the next encoded bit into its vacated LSB.
        loop {
            if high < HALF_RANGE {
                // E1: already in the lower half.
            } else if low >= HALF_RANGE {
                low -= HALF_RANGE;
                high -= HALF_RANGE;
                value -= HALF_RANGE;
            } else if low >= QUARTER_RANGE && high < THREE_QUARTERS_RANGE {
                low -= QUARTER_RANGE;
                high -= QUARTER_RANGE;
                value -= QUARTER_RANGE;
            } else {
                break;
            }
            low *= 2;
            high *= 2;
            value *= 2;
            if read_position < input_bit_length {
                value |= u64::from(encoded.read(read_position));
                read_position += 1;
            }
        }
    }

    Ok(())
}
