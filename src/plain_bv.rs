//! `PlainBitVec`: an uncompressed bit vector with a two-level rank
//! dictionary and binary-search-assisted select.
//!
//! Storage is LSB-first within each word (bit `i` lives in word `i / 64`
//! at mask `1 << (i % 64)`) — the opposite convention from
//! [`crate::bit_buffer::BitBuffer`], chosen because the broadword
//! popcount/select kernels in [`crate::broadword`] are simplest over
//! LSB-first words. [`PlainBitVecBuilder::from_bit_buffer`] bridges the
//! two conventions with a single `reverse_bits` per word.

use std::io::{self, Read, Write};

use crate::broadword;
use crate::bit_buffer::BitBuffer;
use crate::io::{read_i32, read_u64, write_i32, write_u64};
use crate::space_usage::SpaceUsage;

/// Number of bits summed into one small (word-sized) rank block.
const SMALL: u64 = 64;
/// Number of bits summed into one large rank block.
const LARGE: u64 = 512;
/// Number of small blocks (words) per large block.
const RATIO: u64 = LARGE / SMALL;

/// Builder for a [`PlainBitVec`].
///
/// Single-writer: `push_bit`/`set_bit` take `&mut self`, enforcing the
/// append-only build discipline at the type level. Call [`build`] to
/// finalize the rank index and obtain the immutable, queryable
/// `PlainBitVec`.
///
/// [`build`]: PlainBitVecBuilder::build
#[derive(Clone, Debug, Default)]
pub struct PlainBitVecBuilder {
    words: Vec<u64>,
    len: u64,
}

impl PlainBitVecBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        PlainBitVecBuilder {
            words: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty builder with storage for at least `bits` bits
    /// preallocated.
    pub fn with_capacity(bits: u64) -> Self {
        let words = ((bits + 63) / 64) as usize;
        PlainBitVecBuilder {
            words: Vec::with_capacity(words),
            len: 0,
        }
    }

    /// Converts a raw [`BitBuffer`] (MSB-first words) into a builder
    /// holding the same logical bit sequence in `PlainBitVec`'s
    /// LSB-first layout, by reversing each word. This is the "load raw
    /// bits, then build" entry point for a whole-vector conversion.
    pub fn from_bit_buffer(buf: &BitBuffer) -> Self {
        let words: Vec<u64> = buf.words().iter().map(|&w| broadword::reverse_bits(w)).collect();
        PlainBitVecBuilder {
            words,
            len: buf.len(),
        }
    }

    /// The number of bits pushed so far.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether no bits have been pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a single bit.
    #[inline]
    pub fn push_bit(&mut self, b: bool) {
        let i = self.len;
        self.len += 1;
        if i % 64 == 0 {
            self.words.push(0);
        }
        if b {
            *self.words.last_mut().unwrap() |= 1u64 << (i % 64);
        }
    }

    /// Sets bit `i`, growing the builder's length to `i + 1` if smaller.
    pub fn set_bit(&mut self, i: u64, b: bool) {
        let words_needed = (i / 64 + 1) as usize;
        if self.words.len() < words_needed {
            self.words.resize(words_needed, 0);
        }
        if i + 1 > self.len {
            self.len = i + 1;
        }
        let mask = 1u64 << (i % 64);
        if b {
            self.words[(i / 64) as usize] |= mask;
        } else {
            self.words[(i / 64) as usize] &= !mask;
        }
    }

    /// Appends `count` copies of `bit`. Uniform fill is symmetric under
    /// the LSB/MSB distinction, so whole words can be extended directly.
    pub fn push_runs(&mut self, bit: bool, mut count: u64) {
        if count == 0 {
            return;
        }
        let bit_off = self.len % 64;
        if bit_off != 0 {
            let avail = (64 - bit_off).min(count);
            for _ in 0..avail {
                self.push_bit(bit);
            }
            count -= avail;
        }
        let fill = if bit { u64::MAX } else { 0 };
        let whole_words = count / 64;
        if whole_words > 0 {
            self.words.extend(std::iter::repeat(fill).take(whole_words as usize));
            self.len += whole_words * 64;
            count -= whole_words * 64;
        }
        for _ in 0..count {
            self.push_bit(bit);
        }
    }

    /// Finalizes the rank index, consuming the builder.
    pub fn build(self) -> PlainBitVec {
        let PlainBitVecBuilder { words, len } = self;
        let mut r = Vec::with_capacity((words.len() + 7) / 8);
        let mut running = 0u64;
        for (idx, &w) in words.iter().enumerate() {
            if idx as u64 % RATIO == 0 {
                r.push(running);
            }
            running += w.count_ones() as u64;
        }
        PlainBitVec {
            words,
            len,
            s1: running,
            r,
        }
    }
}

/// An immutable, built, uncompressed bit vector supporting O(1)
/// `access`/`rank` and O(log n) `select`.
///
/// `Send + Sync` by construction: no interior mutability, safe to share
/// for concurrent read-only queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlainBitVec {
    words: Vec<u64>,
    len: u64,
    s1: u64,
    r: Vec<u64>,
}

impl PlainBitVec {
    /// The number of bits in the vector.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the vector has no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of 1-bits, i.e. `rank_1(len())`.
    #[inline]
    pub fn count_ones(&self) -> u64 {
        self.s1
    }

    /// The number of 0-bits, i.e. `rank_0(len())`.
    #[inline]
    pub fn count_zeros(&self) -> u64 {
        self.len - self.s1
    }

    /// The number of bits equal to `b`.
    #[inline]
    pub fn size(&self, b: bool) -> u64 {
        if b {
            self.s1
        } else {
            self.len - self.s1
        }
    }

    /// Reads bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn get(&self, i: u64) -> bool {
        assert!(
            i < self.len,
            "PlainBitVec::get: index {} out of bounds for length {}",
            i,
            self.len
        );
        let word = self.words[(i / 64) as usize];
        (word >> (i % 64)) & 1 == 1
    }

    /// Counts bits equal to `b` in `[0, i)`.
    ///
    /// # Panics
    ///
    /// Panics if `i > len()`.
    pub fn rank(&self, i: u64, b: bool) -> u64 {
        assert!(
            i <= self.len,
            "PlainBitVec::rank: index {} out of bounds for length {}",
            i,
            self.len
        );
        if i == 0 {
            return 0;
        }
        let ip = i - 1;
        let q_large = (ip / LARGE) as usize;
        let q_small = (ip / SMALL) as usize;
        let rprime = ip % SMALL;

        let mut rank1 = self.r[q_large];
        let large_word_start = q_large as u64 * RATIO;
        for w in large_word_start as usize..q_small {
            rank1 += self.words[w].count_ones() as u64;
        }
        let mask = if rprime == 63 {
            u64::MAX
        } else {
            (1u64 << (rprime + 1)) - 1
        };
        rank1 += (self.words[q_small] & mask).count_ones() as u64;

        if b {
            rank1
        } else {
            i - rank1
        }
    }

    /// Returns the position of the `k`-th (0-indexed) bit equal to `b`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= size(b)`.
    pub fn select(&self, k: u64, b: bool) -> u64 {
        assert!(
            k < self.size(b),
            "PlainBitVec::select: index {} out of bounds for {} bits",
            k,
            if b { "one" } else { "zero" }
        );

        let adjusted = |j: usize| -> u64 {
            if b {
                self.r[j]
            } else {
                j as u64 * LARGE - self.r[j]
            }
        };

        // Binary search for the largest j with adjusted(j) <= k.
        let mut lo = 0usize;
        let mut hi = self.r.len();
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            if adjusted(mid) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let mut remaining = k - adjusted(lo);
        let mut word_idx = lo * RATIO as usize;
        loop {
            let raw = self.words[word_idx];
            let word = if b { raw } else { !raw };
            let ones = word.count_ones() as u64;
            if remaining < ones {
                return word_idx as u64 * 64 + broadword::select_in_word(word, remaining as u32) as u64;
            }
            remaining -= ones;
            word_idx += 1;
        }
    }

    /// Writes this vector's serialization: `n: u64`, `s1: u64`,
    /// `|words|: i32`, words, `|r|: i32`, large-block sums.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        write_u64(w, self.len)?;
        write_u64(w, self.s1)?;
        write_i32(w, self.words.len() as i32)?;
        for &word in &self.words {
            write_u64(w, word)?;
        }
        write_i32(w, self.r.len() as i32)?;
        for &sum in &self.r {
            write_u64(w, sum)?;
        }
        Ok(())
    }

    /// Reads a vector written by [`PlainBitVec::write_to`].
    pub fn read_from(r: &mut impl Read) -> io::Result<Self> {
        let len = read_u64(r)?;
        let s1 = read_u64(r)?;
        let nwords = read_i32(r)? as usize;
        let mut words = Vec::with_capacity(nwords);
        for _ in 0..nwords {
            words.push(read_u64(r)?);
        }
        let nr = read_i32(r)? as usize;
        let mut rvec = Vec::with_capacity(nr);
        for _ in 0..nr {
            rvec.push(read_u64(r)?);
        }
        Ok(PlainBitVec {
            words,
            len,
            s1,
            r: rvec,
        })
    }
}

impl crate::BitVector for PlainBitVec {
    #[inline]
    fn len(&self) -> u64 {
        PlainBitVec::len(self)
    }

    #[inline]
    fn get(&self, i: u64) -> bool {
        PlainBitVec::get(self, i)
    }

    #[inline]
    fn rank(&self, i: u64, b: bool) -> u64 {
        PlainBitVec::rank(self, i, b)
    }

    #[inline]
    fn select(&self, k: u64, b: bool) -> u64 {
        PlainBitVec::select(self, k, b)
    }
}

impl SpaceUsage for PlainBitVec {
    #[inline]
    fn is_stack_only() -> bool {
        false
    }

    fn heap_bytes(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<u64>() + self.r.capacity() * std::mem::size_of::<u64>()
    }
}
