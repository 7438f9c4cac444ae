//! # Binary Entropy Coding
//!
//! *Two reversible codecs that squeeze a biased bit stream down to its
//! entropy.*
//!
//! ## Intuition First
//!
//! Imagine narrating a long series of coin flips from a coin that lands
//! heads 90% of the time. Spelling out every flip wastes breath; what you
//! really want is to spend *less than one word per flip* on the common
//! outcome and more on the rare one. Entropy coders do exactly that with
//! bits: a predictable bit costs a fraction of an output bit, a surprising
//! bit costs several.
//!
//! This crate implements two independent ways of doing it for a binary
//! source with a known, fixed probability `p` of emitting a 1:
//!
//! - **Binary arithmetic coding** pins the message to an ever-narrowing
//!   numeric interval; each input bit picks the sub-interval whose width
//!   matches its probability.
//! - **Binary range ANS (rANS)** folds the message into a single integer
//!   state; each input bit multiplies the state up by roughly `1/p(bit)`,
//!   and bytes are flushed out to keep the state bounded.
//!
//! ## The Problem
//!
//! Coding one binary symbol at a time exposes the classic trade-off in its
//! purest form:
//!
//! - **Arithmetic coding**: reaches the entropy but historically leaned on
//!   per-symbol multiplications, divisions, and careful carry handling.
//! - **ANS**: reaches the entropy with a cheaper inner loop, but encodes in
//!   reverse and needs its state renormalization to be exactly right.
//!
//! Both inner loops here are division-free: interval boundaries go through a
//! fixed-point multiplier ([`FractionMultiplier`]) and the rANS state
//! division goes through a precomputed magic-number divider ([`FastDiv31`]).
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon     Entropy as the fundamental limit
//! 1976  Rissanen    Arithmetic coding: optimal rate
//! 1987  Witten-Neal-Cleary  Practical arithmetic coding with E1/E2/E3
//! 1998  Moffat-Neal-Witten  Arithmetic coding revisited: integer ranges
//! 2002  Warren      Hacker's Delight: exact division by magic numbers
//! 2009  Duda        ANS: arithmetic-coding rate at table-lookup speed
//! 2014  Giesen      ryg_rans: the practical byte-wise rANS recipe
//! ```
//!
//! The key discipline shared by both codecs is renormalization: keep the
//! working state inside a fixed integer window, emit output exactly when the
//! window would overflow, and make the decoder's window arithmetic mirror
//! the encoder's bit for bit.
//!
//! ## Mathematical Formulation
//!
//! A Bernoulli source with `Pr(1) = p` has entropy
//!
//! ```text
//! H(p) = -p·log2(p) - (1-p)·log2(1-p)   bits per symbol
//! ```
//!
//! Arithmetic coding narrows `[low, high)` by `boundary = low + range·(1-p)`
//! per bit. rANS steps the state with `C(x, s) = M·⌊x/f_s⌋ + cum_s + (x mod
//! f_s)` where the integer frequencies `f_0 + f_1 = M = 2^R` quantize the
//! probabilities. Both approach `N·H(p)` output bits for an `N`-bit message.
//!
//! ## Complexity Analysis
//!
//! - **Time**: `O(1)` per bit for both codecs; the rANS transition can also
//!   be a single table lookup.
//! - **Space**: `O(1)` working state; optional rANS tables take `O(2^R)`
//!   entries (the encoder table is `2·256·M` words, 32 MiB at `R = 12`).
//!
//! ## Failure Modes
//!
//! 1. **Quantization loss**: rANS frequencies are integers; very small `R`
//!    rounds probabilities coarsely and costs compression.
//! 2. **Table footprint**: large `R` makes transition tables blow past CPU
//!    caches; table mode pays off only around `R = 8..12`.
//! 3. **Degenerate probabilities**: `p` of exactly 0 or 1 would collapse an
//!    interval or a frequency; both coders clip so every message stays
//!    codable, at a rate cost on the "impossible" symbol.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - [`arithmetic`]: encoder/decoder with E1/E2/E3 renormalization and
//!   pending-bit underflow handling over a 32-bit range.
//! - [`BinaryRangeAnsCoder`]: byte-renormalized binary rANS, with optional
//!   precomputed transition tables for tANS-like inner loops.
//! - [`BitArray`] / [`OutputBitStream`]: the LSB-first bit substrate both
//!   codecs are defined against.
//!
//! Neither codec writes a length header or frames the rANS final state;
//! callers carry the message length and state to the decoder themselves.
//!
//! ## References
//!
//! - Witten, I. H., Neal, R. M., & Cleary, J. G. (1987). "Arithmetic coding
//!   for data compression."
//! - Duda, J. (2009). "Asymmetric numeral systems: entropy coding combining
//!   speed of Huffman coding with compression rate of arithmetic coding."
//! - Warren, H. S. (2002). "Hacker's Delight", chapter 10.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arithmetic;
pub mod bits;
pub mod error;
pub mod fastdiv;
pub mod fastmul;
pub mod rans;

pub use bits::{BitArray, OutputBitStream};
pub use error::{Error, ErrorKind};
pub use fastdiv::FastDiv31;
pub use fastmul::FractionMultiplier;
pub use rans::BinaryRangeAnsCoder;
