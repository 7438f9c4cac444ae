//! Binary Range Asymmetric Numeral Systems (bRANS) coder.
//!
//! rANS folds a whole message into a single integer state: encoding a symbol
//! multiplies the state up by roughly `1 / p(symbol)`, and byte-granular
//! renormalization keeps the state inside a fixed 32-bit window. Because the
//! state transition is last-in-first-out, the encoder walks the message from
//! tail to head and reverses its output bytes, so the decoder can stream
//! forward and revisit the encoder's states in reverse.
//!
//! Symbol probabilities are quantized to integer frequencies over a
//! power-of-two total `M = 2^R`, `R ∈ [2, 23]`. Between steps the state `x`
//! stays in `[M, 256·M)`; a fresh coder starts (and a correct decode ends)
//! at exactly `M`. Flushing is per-symbol: the encoder emits low bytes of
//! `x` while `x ≥ 256·f_s`, which is precisely the window that lets the
//! decoder recognize where to "unflush" a byte back in.
//!
//! The encoder's division by a symbol frequency runs through a precomputed
//! [`FastDiv31`], and both transitions can optionally be precomputed into
//! full state tables ([`build_encoder_table`](BinaryRangeAnsCoder::build_encoder_table) /
//! [`build_decoder_table`](BinaryRangeAnsCoder::build_decoder_table)),
//! turning the inner loops into plain lookups in the manner of tANS. Table
//! and non-table modes produce byte-identical output.
//!
//! The final state is returned as a `u32` and is deliberately not written to
//! the byte stream; callers choose their own fixed- or variable-length
//! framing for it.

use crate::bits::BitArray;
use crate::error::{Error, Result};
use crate::fastdiv::FastDiv31;

/// Binary rANS encoder/decoder for a fixed Bernoulli probability, with
/// optional precomputed state-transition tables.
pub struct BinaryRangeAnsCoder {
    frequency_bits: u32,
    total_frequency: u32,
    frequency_of: [u32; 2],
    cumulative_frequency_of: [u32; 2],
    flush_threshold_of: [u32; 2],
    divider_of: [FastDiv31; 2],
    // Empty until built. Encoder entries are indexed `state * 2 + symbol`;
    // decoder entries are `(next_state << 1) | symbol`, lossless because
    // states stay below 2^31 for every supported frequency width.
    encoder_table: Vec<u32>,
    decoder_table: Vec<u32>,
}

impl BinaryRangeAnsCoder {
    /// Create a coder for `probability_of_one` over a `2^frequency_bits`
    /// frequency space.
    ///
    /// Larger widths quantize the probability more finely but make the
    /// optional tables bigger; table users should stay around 8–12 bits.
    /// Both symbol frequencies are kept at least 1, so even degenerate
    /// probabilities leave every message encodable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbability`] when `probability_of_one` is
    /// outside `[0.0, 1.0]` or NaN, and [`Error::InvalidFrequencyBits`] when
    /// `frequency_bits` is outside `[2, 23]`.
    pub fn new(probability_of_one: f64, frequency_bits: u32) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability_of_one) {
            return Err(Error::InvalidProbability(probability_of_one));
        }
        if !(2..=23).contains(&frequency_bits) {
            return Err(Error::InvalidFrequencyBits(frequency_bits));
        }

        let total_frequency = 1u32 << frequency_bits;
        let probability_of_zero = 1.0 - probability_of_one;
        let frequency_of_zero = ((probability_of_zero * f64::from(total_frequency)).round()
            as u32)
            .clamp(1, total_frequency - 1);
        let frequency_of = [frequency_of_zero, total_frequency - frequency_of_zero];

        Ok(Self {
            frequency_bits,
            total_frequency,
            frequency_of,
            cumulative_frequency_of: [0, frequency_of_zero],
            flush_threshold_of: [frequency_of[0] * 256, frequency_of[1] * 256],
            divider_of: [
                FastDiv31::new(frequency_of[0])?,
                FastDiv31::new(frequency_of[1])?,
            ],
            encoder_table: Vec::new(),
            decoder_table: Vec::new(),
        })
    }

    /// Total frequency `M = 2^frequency_bits`.
    pub fn total_frequency(&self) -> u32 {
        self.total_frequency
    }

    /// Quantized frequency of `symbol` (0 or 1).
    pub fn frequency_of(&self, symbol: u8) -> u32 {
        self.frequency_of[usize::from(symbol & 1)]
    }

    /// Number of frequency space bits `R`.
    pub fn frequency_bits(&self) -> u32 {
        self.frequency_bits
    }

    /// Whether [`build_encoder_table`](Self::build_encoder_table) has run.
    pub fn has_encoder_table(&self) -> bool {
        !self.encoder_table.is_empty()
    }

    /// Whether [`build_decoder_table`](Self::build_decoder_table) has run.
    pub fn has_decoder_table(&self) -> bool {
        !self.decoder_table.is_empty()
    }

    /// Upper bound of the state window, `256 · M`. States never reach it.
    #[inline]
    fn state_window(&self) -> u32 {
        self.total_frequency << 8
    }

    /// Next encoder state for `(state, symbol)`.
    #[inline]
    fn encoder_transition(&self, state: u32, symbol: u8) -> u32 {
        let s = usize::from(symbol);
        let (quotient, remainder) = self.divider_of[s].div_rem(state);
        self.total_frequency * quotient + self.cumulative_frequency_of[s] + remainder
    }

    /// Next decoder state and the decoded symbol for `state`.
    #[inline]
    fn decoder_transition(&self, state: u32) -> (u32, u8) {
        // M is a power of two, so quotient and remainder are a shift and a
        // mask.
        let quotient = state >> self.frequency_bits;
        let remainder = state & (self.total_frequency - 1);
        let symbol = u8::from(remainder >= self.cumulative_frequency_of[1]);
        let s = usize::from(symbol);
        let next_state =
            self.frequency_of[s] * quotient + remainder - self.cumulative_frequency_of[s];
        (next_state, symbol)
    }

    /// Shared encode loop; `transition` supplies the per-step state update.
    fn encode_loop<F>(&self, input: &BitArray<'_>, output: &mut Vec<u8>, transition: F) -> u32
    where
        F: Fn(u32, u8) -> u32,
    {
        let appended_from = output.len();
        let mut state = self.total_frequency;

        // Message bits are consumed in reverse so the decoder, reading
        // forward, revisits the encoder's states last-to-first.
        for read_position in (0..input.bit_length()).rev() {
            let symbol = input.read(read_position);

            // Flush low bytes until the next transition lands back inside
            // the state window. The threshold is per-symbol: after flushing,
            // the state is small enough that the decoder's unflush check
            // (state < M) fires at the matching step.
            let flush_threshold = self.flush_threshold_of[usize::from(symbol)];
            while state >= flush_threshold {
                output.push((state & 0xFF) as u8);
                state >>= 8;
            }

            state = transition(state, symbol);
            debug_assert!(state >= self.total_frequency);
            debug_assert!(state < self.state_window());
        }

        // Reverse only the bytes this call appended; an existing prefix in
        // `output` is preserved untouched.
        output[appended_from..].reverse();

        state
    }

    /// Shared decode loop; `transition` supplies the per-step state update.
    fn decode_loop<F>(
        &self,
        encoded_bytes: &[u8],
        state: u32,
        output: &mut BitArray<'_>,
        transition: F,
    ) where
        F: Fn(u32) -> (u32, u8),
    {
        // A state from a matching encode is always inside the window and
        // passes through unchanged; anything else is masked into range so
        // decoding of inconsistent input stays defined.
        let mut state = state & (self.state_window() - 1);
        let mut read_position = 0;

        for write_position in 0..output.bit_length() {
            while state < self.total_frequency && read_position < encoded_bytes.len() {
                state = (state << 8) | u32::from(encoded_bytes[read_position]);
                read_position += 1;
            }

            let (next_state, symbol) = transition(state);
            state = next_state;
            output.write(write_position, symbol);
        }
    }

    /// Encode the message bits of `input`, appending the encoded bytes to
    /// `output` and returning the final state.
    ///
    /// The appended bytes are already in the order the decoder consumes
    /// them. The final state lies in `[M, 256·M)` and must be conveyed to
    /// the decoder separately; this crate does not serialize it.
    pub fn encode(&self, input: &BitArray<'_>, output: &mut Vec<u8>) -> u32 {
        self.encode_loop(input, output, |state, symbol| {
            self.encoder_transition(state, symbol)
        })
    }

    /// Decode `output.bit_length()` bits from `encoded_bytes` and the final
    /// `state` a matching [`encode`](Self::encode) returned.
    ///
    /// A correct decode consumes every encoded byte and ends at the initial
    /// encoder state `M`. Inconsistent inputs produce some bit sequence
    /// without panicking.
    pub fn decode(&self, encoded_bytes: &[u8], state: u32, output: &mut BitArray<'_>) {
        self.decode_loop(encoded_bytes, state, output, |state| {
            self.decoder_transition(state)
        });
    }

    /// Precompute the encoder state-transition table.
    ///
    /// The table holds `2 · 256 · M` entries of 4 bytes (for example 32 MiB
    /// at `R = 12`, 2 MiB at `R = 8`). Building is idempotent.
    pub fn build_encoder_table(&mut self) {
        if self.has_encoder_table() {
            return;
        }

        let state_count = self.state_window();
        let mut table = Vec::with_capacity(state_count as usize * 2);
        for state in 0..state_count {
            for symbol in 0..2u8 {
                // The encode loop flushes the state below the symbol's
                // threshold before every lookup, so entries at or above it
                // are never consulted.
                let entry = if state < self.flush_threshold_of[usize::from(symbol)] {
                    self.encoder_transition(state, symbol)
                } else {
                    0
                };
                table.push(entry);
            }
        }
        self.encoder_table = table;
    }

    /// Precompute the decoder state-transition table.
    ///
    /// The table holds `256 · M` packed 4-byte entries, half the encoder
    /// table's footprint. Building is idempotent.
    pub fn build_decoder_table(&mut self) {
        if self.has_decoder_table() {
            return;
        }

        let state_count = self.state_window();
        let mut table = Vec::with_capacity(state_count as usize);
        for state in 0..state_count {
            let (next_state, symbol) = self.decoder_transition(state);
            table.push((next_state << 1) | u32::from(symbol));
        }
        self.decoder_table = table;
    }

    /// Table-backed [`encode`](Self::encode); byte- and state-identical to
    /// the arithmetic mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableNotBuilt`] when
    /// [`build_encoder_table`](Self::build_encoder_table) has not run. The
    /// output vector is untouched on error.
    pub fn encode_using_table(&self, input: &BitArray<'_>, output: &mut Vec<u8>) -> Result<u32> {
        if !self.has_encoder_table() {
            return Err(Error::TableNotBuilt("encoder"));
        }
        Ok(self.encode_loop(input, output, |state, symbol| {
            self.encoder_table[state as usize * 2 + usize::from(symbol)]
        }))
    }

    /// Table-backed [`decode`](Self::decode); bit-identical to the
    /// arithmetic mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableNotBuilt`] when
    /// [`build_decoder_table`](Self::build_decoder_table) has not run. The
    /// output view is untouched on error.
    pub fn decode_using_table(
        &self,
        encoded_bytes: &[u8],
        state: u32,
        output: &mut BitArray<'_>,
    ) -> Result<()> {
        if !self.has_decoder_table() {
            return Err(Error::TableNotBuilt("decoder"));
        }
        self.decode_loop(encoded_bytes, state, output, |state| {
            let entry = self.decoder_table[state as usize];
            (entry >> 1, (entry & 1) as u8)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pack_bits(bits: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; bits.len().div_ceil(8)];
        for (position, &bit) in bits.iter().enumerate() {
            bytes[position / 8] |= (bit & 1) << (position % 8);
        }
        bytes
    }

    fn encode_bits(coder: &BinaryRangeAnsCoder, bits: &[u8]) -> (Vec<u8>, u32) {
        let mut message_bytes = pack_bits(bits);
        let message = BitArray::new(&mut message_bytes, bits.len()).unwrap();
        let mut encoded = Vec::new();
        let state = coder.encode(&message, &mut encoded);
        (encoded, state)
    }

    fn decode_bits(
        coder: &BinaryRangeAnsCoder,
        encoded: &[u8],
        state: u32,
        bit_length: usize,
    ) -> Vec<u8> {
        let mut decoded_bytes = vec![0u8; bit_length.div_ceil(8)];
        let mut decoded = BitArray::new(&mut decoded_bytes, bit_length).unwrap();
        coder.decode(encoded, state, &mut decoded);
        (0..bit_length)
            .map(|position| decoded.read(position))
            .collect()
    }

    #[test]
    fn test_rejects_invalid_construction() {
        assert_eq!(
            BinaryRangeAnsCoder::new(1.5, 8).err(),
            Some(Error::InvalidProbability(1.5))
        );
        assert!(BinaryRangeAnsCoder::new(f64::NAN, 8).is_err());
        assert_eq!(
            BinaryRangeAnsCoder::new(0.5, 1).err(),
            Some(Error::InvalidFrequencyBits(1))
        );
        assert_eq!(
            BinaryRangeAnsCoder::new(0.5, 24).err(),
            Some(Error::InvalidFrequencyBits(24))
        );
        assert!(BinaryRangeAnsCoder::new(0.5, 2).is_ok());
        assert!(BinaryRangeAnsCoder::new(0.5, 23).is_ok());
    }

    #[test]
    fn test_frequencies_partition_the_space() {
        let coder = BinaryRangeAnsCoder::new(0.3, 12).unwrap();
        assert_eq!(coder.total_frequency(), 4096);
        assert_eq!(coder.frequency_of(0) + coder.frequency_of(1), 4096);
        assert_eq!(coder.frequency_of(0), 2867); // round(0.7 · 4096)

        // Degenerate probabilities keep both frequencies at least 1.
        let skewed = BinaryRangeAnsCoder::new(1.0, 8).unwrap();
        assert_eq!(skewed.frequency_of(0), 1);
        assert_eq!(skewed.frequency_of(1), 255);
    }

    #[test]
    fn test_alternating_byte_round_trips() {
        let coder = BinaryRangeAnsCoder::new(0.5, 8).unwrap();
        let bits = [1u8, 0, 1, 0, 1, 0, 1, 0];
        let (encoded, state) = encode_bits(&coder, &bits);
        assert!(state >= 256 && state < 65_536, "state {state}");
        assert_eq!(decode_bits(&coder, &encoded, state, 8), bits);
    }

    #[test]
    fn test_empty_message() {
        let coder = BinaryRangeAnsCoder::new(0.5, 8).unwrap();
        let (encoded, state) = encode_bits(&coder, &[]);
        assert!(encoded.is_empty());
        assert_eq!(state, coder.total_frequency());
        assert_eq!(decode_bits(&coder, &encoded, state, 0), Vec::<u8>::new());
    }

    #[test]
    fn test_existing_output_prefix_is_preserved() {
        let coder = BinaryRangeAnsCoder::new(0.3, 10).unwrap();
        let bits = [1u8, 1, 0, 1, 0, 0, 0, 1, 1, 0, 0, 0];

        let mut prefixed = vec![0xDE, 0xAD];
        let mut message_bytes = pack_bits(&bits);
        let message = BitArray::new(&mut message_bytes, bits.len()).unwrap();
        let state = coder.encode(&message, &mut prefixed);

        assert_eq!(&prefixed[..2], &[0xDE, 0xAD]);
        assert_eq!(decode_bits(&coder, &prefixed[2..], state, bits.len()), bits);
    }

    #[test]
    fn test_table_methods_require_built_tables() {
        let coder = BinaryRangeAnsCoder::new(0.5, 8).unwrap();
        let mut message_bytes = [0u8];
        let message = BitArray::new(&mut message_bytes, 8).unwrap();
        let mut output = Vec::new();
        assert_eq!(
            coder.encode_using_table(&message, &mut output).err(),
            Some(Error::TableNotBuilt("encoder"))
        );
        assert!(output.is_empty());

        let mut decoded_bytes = [0u8];
        let mut decoded = BitArray::new(&mut decoded_bytes, 8).unwrap();
        assert_eq!(
            coder.decode_using_table(&[], 256, &mut decoded).err(),
            Some(Error::TableNotBuilt("decoder"))
        );
    }

    #[test]
    fn test_table_and_arithmetic_modes_agree() {
        for (probability, frequency_bits) in [(0.3, 8u32), (0.5, 10), (0.7, 12)] {
            let mut coder = BinaryRangeAnsCoder::new(probability, frequency_bits).unwrap();
            coder.build_encoder_table();
            coder.build_decoder_table();

            let bits: Vec<u8> = (0..500)
                .map(|i| u8::from((i * 7 + i / 3) % 10 < 4))
                .collect();
            let (encoded, state) = encode_bits(&coder, &bits);

            let mut message_bytes = pack_bits(&bits);
            let message = BitArray::new(&mut message_bytes, bits.len()).unwrap();
            let mut table_encoded = Vec::new();
            let table_state = coder
                .encode_using_table(&message, &mut table_encoded)
                .unwrap();

            assert_eq!(
                table_encoded, encoded,
                "p = {probability}, R = {frequency_bits}"
            );
            assert_eq!(table_state, state);

            let mut decoded_bytes = vec![0u8; bits.len().div_ceil(8)];
            let mut decoded = BitArray::new(&mut decoded_bytes, bits.len()).unwrap();
            coder
                .decode_using_table(&encoded, state, &mut decoded)
                .unwrap();
            let table_decoded: Vec<u8> = (0..bits.len())
                .map(|position| decoded.read(position))
                .collect();
            assert_eq!(table_decoded, bits);
        }
    }

    #[test]
    fn test_table_build_is_idempotent() {
        let mut coder = BinaryRangeAnsCoder::new(0.4, 8).unwrap();
        coder.build_decoder_table();
        let first = coder.decoder_table.clone();
        coder.build_decoder_table();
        assert_eq!(coder.decoder_table, first);
        assert!(coder.has_decoder_table());
        assert!(!coder.has_encoder_table());
    }

    #[test]
    fn test_inconsistent_decode_is_defined() {
        let coder = BinaryRangeAnsCoder::new(0.5, 8).unwrap();
        // Garbage bytes and an out-of-window state: some bits come out, no
        // panic.
        let garbage = [0xAA, 0x55, 0xFF, 0x00];
        let decoded = decode_bits(&coder, &garbage, u32::MAX, 32);
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn test_minimum_frequency_width() {
        let coder = BinaryRangeAnsCoder::new(0.5, 2).unwrap();
        let bits = [0u8, 1, 1, 0, 1, 0, 0, 1, 1, 1];
        let (encoded, state) = encode_bits(&coder, &bits);
        assert_eq!(decode_bits(&coder, &encoded, state, bits.len()), bits);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            bits in prop::collection::vec(0u8..2, 0..500),
            probability in 0.0f64..=1.0,
            frequency_bits in 2u32..=23,
        ) {
            let coder = BinaryRangeAnsCoder::new(probability, frequency_bits).unwrap();
            let (encoded, state) = encode_bits(&coder, &bits);
            prop_assert!(state >= coder.total_frequency());
            prop_assert!(u64::from(state) < u64::from(coder.total_frequency()) * 256);
            prop_assert_eq!(decode_bits(&coder, &encoded, state, bits.len()), bits);
        }

        #[test]
        fn prop_table_modes_match(
            bits in prop::collection::vec(0u8..2, 0..200),
            probability in 0.0f64..=1.0,
        ) {
            let mut coder = BinaryRangeAnsCoder::new(probability, 8).unwrap();
            coder.build_encoder_table();
            coder.build_decoder_table();

            let (encoded, state) = encode_bits(&coder, &bits);

            let mut message_bytes = pack_bits(&bits);
            let message = BitArray::new(&mut message_bytes, bits.len()).unwrap();
            let mut table_encoded = Vec::new();
            let table_state = coder.encode_using_table(&message, &mut table_encoded).unwrap();
            prop_assert_eq!(&table_encoded, &encoded);
            prop_assert_eq!(table_state, state);

            let mut decoded_bytes = vec![0u8; bits.len().div_ceil(8)];
            let mut decoded = BitArray::new(&mut decoded_bytes, bits.len()).unwrap();
            coder.decode_using_table(&encoded, state, &mut decoded).unwrap();
            for (position, &bit) in bits.iter().enumerate() {
                prop_assert_eq!(decoded.read(position), bit);
            }
        }
    }
}
