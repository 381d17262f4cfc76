//! Succinct bit vectors: plain rank/select, RRR compression, and
//! Elias-Fano sequences.
//!
//! Three tightly coupled structures, each taking raw bits through a
//! single-writer builder and a `build()` step into an immutable,
//! `Send + Sync` query type:
//!
//! - [`BitBuffer`] — the append-only / random-write raw bit container
//!   callers load input into.
//! - [`PlainBitVec`] — an uncompressed bit vector with a two-level rank
//!   dictionary and binary-search-assisted select.
//! - [`RrrBitVec`] — a Raman–Raman–Rao class/offset compressed bit
//!   vector, `nH₀ + o(n)` bits, same query interface as `PlainBitVec`.
//! - [`EliasFanoSeq`] — a succinct non-decreasing integer sequence; both
//!   independently useful and the index substrate `RrrBitVec` uses for
//!   its super-block samples.
//!
//! # Usage
//!
//! ```
//! use succinct_bv::{PlainBitVecBuilder, BitVector};
//!
//! let mut builder = PlainBitVecBuilder::new();
//! for bit in [true, false, false, true, true] {
//!     builder.push_bit(bit);
//! }
//! let bv = builder.build();
//!
//! assert_eq!(bv.rank(3, true), 1);
//! assert_eq!(bv.select(1, true), 3);
//! ```

pub mod bit_buffer;
pub mod broadword;
pub mod elias_fano;
pub mod error;
pub mod io;
pub mod plain_bv;
pub mod rrr;
pub mod space_usage;

pub use bit_buffer::BitBuffer;
pub use elias_fano::{EliasFanoBuilder, EliasFanoSeq};
pub use error::{Error, Result};
pub use plain_bv::{PlainBitVec, PlainBitVecBuilder};
pub use rrr::{RrrBitVec, RrrBitVecBuilder};
pub use space_usage::SpaceUsage;

/// Shared query interface over a built bit vector.
///
/// Lets generic code abstract over [`PlainBitVec`] and [`RrrBitVec`]
/// without virtual dispatch. No `dyn Trait` is used on the query hot
/// path; callers who want static dispatch over either type can write
/// ordinary generic functions bounded by `BitVector`.
pub trait BitVector {
    /// The number of bits in the vector.
    fn len(&self) -> u64;

    /// Whether the vector has no bits.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads bit `i`. Panics if `i >= len()`.
    fn get(&self, i: u64) -> bool;

    /// Counts bits equal to `b` in `[0, i)`. Panics if `i > len()`.
    fn rank(&self, i: u64, b: bool) -> u64;

    /// Returns the position of the `k`-th (0-indexed) bit equal to `b`.
    /// Panics if `k` is out of range.
    fn select(&self, k: u64, b: bool) -> u64;

    /// The number of 1-bits.
    #[inline]
    fn count_ones(&self) -> u64 {
        self.rank(self.len(), true)
    }

    /// The number of 0-bits.
    #[inline]
    fn count_zeros(&self) -> u64 {
        self.len() - self.count_ones()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plain_bv::PlainBitVecBuilder;
    use crate::rrr::RrrBitVecBuilder;

    fn exercise<V: BitVector>(bv: &V, bits: &[bool]) {
        assert_eq!(bv.len(), bits.len() as u64);
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(bv.get(i as u64), b);
        }
        let ones = bits.iter().filter(|&&b| b).count() as u64;
        assert_eq!(bv.count_ones(), ones);
        assert_eq!(bv.count_zeros(), bits.len() as u64 - ones);
    }

    /// Both concrete vector types satisfy the same generic `BitVector`
    /// bound and agree with a naive reference.
    #[test]
    fn bit_vector_trait_is_shared() {
        let bits = [true, false, true, true, false, false, true];

        let mut plain_builder = PlainBitVecBuilder::new();
        for &b in &bits {
            plain_builder.push_bit(b);
        }
        exercise(&plain_builder.build(), &bits);

        let mut rrr_builder = RrrBitVecBuilder::new();
        for (i, &b) in bits.iter().enumerate() {
            rrr_builder.set(i as u64, b);
        }
        exercise(&rrr_builder.build(), &bits);
    }
}
