//! Error types for builder misuse.
//!
//! Out-of-bounds queries and queries on an unbuilt structure are
//! programming bugs, not recoverable conditions: they panic (or, for
//! "query before build", are rejected at compile time by the
//! builder/built type split) rather than returning a `Result`. See the
//! crate's design notes for why. The errors below are the ones a caller
//! can legitimately trigger with valid-looking input and is expected to
//! handle.

use thiserror::Error;

/// Errors produced while building a structure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A `BitBuffer` push or fetch was asked for a bit width outside
    /// `[0, 64]`.
    #[error("bit width {0} out of range [0, 64]")]
    InvalidWidth(u32),

    /// An `EliasFanoBuilder::push` value was smaller than the previously
    /// pushed value; the sequence must be non-decreasing.
    #[error("elias-fano push {value} is less than last pushed value {last}")]
    OrderViolation { value: u64, last: u64 },

    /// An `EliasFanoBuilder::push` would exceed the capacity declared at
    /// construction time.
    #[error("elias-fano push count would exceed declared capacity {capacity}")]
    CapacityExceeded { capacity: u64 },

    /// An `EliasFanoBuilder::push` value exceeded the declared upper
    /// bound.
    #[error("elias-fano push value {value} exceeds declared upper bound {upper_bound}")]
    UpperBoundExceeded { value: u64, upper_bound: u64 },
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
