//! Error types for the binary entropy coders.

use thiserror::Error;

/// Coarse classification of an [`Error`].
///
/// Every failure in this crate is either a caller-supplied argument outside
/// its documented domain, or an operation invoked before its prerequisite
/// setup step. Inner encode/decode loops never fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller-supplied argument was outside its documented domain.
    InvalidArgument,
    /// An operation was invoked before its prerequisite setup step.
    Precondition,
}

/// Error variants for coder construction and use.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Provided probability is outside `[0.0, 1.0]` or not finite.
    #[error("invalid probability: {0}")]
    InvalidProbability(f64),

    /// Frequency space width is outside `[2, 23]` bits.
    #[error("invalid frequency space width: {0} bits")]
    InvalidFrequencyBits(u32),

    /// Provided fraction is outside `[0.0, 1.0]` or not finite.
    #[error("invalid fraction: {0}")]
    InvalidFraction(f64),

    /// Divisor does not fit in 31 bits.
    #[error("divisor {0} does not fit in 31 bits")]
    InvalidDivisor(u32),

    /// A bit view was requested over a byte buffer with too little capacity.
    #[error("buffer of {capacity} bytes cannot hold {bits} bits")]
    BufferTooSmall {
        /// Requested length of the view, in bits.
        bits: usize,
        /// Capacity of the backing buffer, in bytes.
        capacity: usize,
    },

    /// A table-based method was called before building the required table.
    #[error("{0} state transition table has not been built")]
    TableNotBuilt(&'static str),
}

impl Error {
    /// The coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TableNotBuilt(_) => ErrorKind::Precondition,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// A specialized Result type for entropy coding operations.
pub type Result<T> = std::result::Result<T, Error>;
