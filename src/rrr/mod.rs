//! `RrrBitVec`: a Raman–Raman–Rao class/offset compressed bit vector,
//! `nH₀ + o(n)` bits, answering `access`/`rank`/`select` in O(1)
//! amortized.
//!
//! The vector is split into fixed `T = 63`-bit blocks; each block is
//! stored as its *class* (popcount, 6 bits) and *offset* (its
//! lexicographic rank among same-class blocks, variable width — see
//! [`tables`]). Blocks are grouped into super-blocks of `F = 32`, each
//! summarized by a running rank and a bit-offset into the offset stream;
//! both summaries are themselves stored in an [`EliasFanoSeq`], since
//! they are non-decreasing sequences.

pub mod tables;

use std::io::{self, Read, Write};

use tables::{bits_for_offset, of_offset, offset_of, BITS_PER_CLASS, F, S, T};

use crate::bit_buffer::BitBuffer;
use crate::elias_fano::{EliasFanoBuilder, EliasFanoSeq};
use crate::io::{read_u64, write_u64};
use crate::space_usage::SpaceUsage;

/// Builder for an [`RrrBitVec`].
///
/// Delegates its `push`/`set` to an internal [`BitBuffer`] collecting
/// the raw source bits; [`build`](RrrBitVecBuilder::build) performs the
/// single linear encoding pass described in the block-build algorithm.
#[derive(Clone, Debug, Default)]
pub struct RrrBitVecBuilder {
    source: BitBuffer,
}

impl RrrBitVecBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        RrrBitVecBuilder {
            source: BitBuffer::new(),
        }
    }

    /// Creates an empty builder with storage for at least `bits` bits
    /// preallocated.
    pub fn with_capacity(bits: u64) -> Self {
        RrrBitVecBuilder {
            source: BitBuffer::with_capacity(bits),
        }
    }

    /// Appends the low `width` bits of `value`, MSB-first.
    pub fn push(&mut self, value: u64, width: u32) -> crate::error::Result<()> {
        self.source.push(value, width)
    }

    /// Sets bit `i` of the source sequence, growing it if necessary.
    pub fn set(&mut self, i: u64, b: bool) {
        self.source.set(i, b)
    }

    /// Appends `count` copies of `bit` to the source sequence.
    pub fn push_runs(&mut self, bit: bool, count: u64) {
        self.source.push_runs(bit, count)
    }

    /// Runs the block-build algorithm over the accumulated source bits,
    /// consuming the builder.
    pub fn build(self) -> RrrBitVec {
        RrrBitVec::build_from(&self.source)
    }
}

/// An immutable, built, RRR-compressed bit vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RrrBitVec {
    n: u64,
    s1: u64,
    class_codes: BitBuffer,
    offset_codes: BitBuffer,
    rank_samples: EliasFanoSeq,
    offset_pos_samples: EliasFanoSeq,
}

/// Reads `T` bits of `source` starting at `pos`, zero-padding past
/// `source.len()`. The valid bits occupy the high (MSB) end of the
/// returned `T`-bit field, matching the convention that intra-block
/// position `0` is the block's own MSB.
fn fetch_block_bits(source: &BitBuffer, pos: u64) -> u64 {
    let available = source.len().saturating_sub(pos);
    if available >= T as u64 {
        source.fetch64(pos, T as u32).expect("T <= 64")
    } else if available == 0 {
        0
    } else {
        let partial = source.fetch64(pos, available as u32).expect("available < T <= 64");
        partial << (T as u64 - available)
    }
}

impl RrrBitVec {
    fn build_from(source: &BitBuffer) -> RrrBitVec {
        let n = source.len();
        let nblocks = if n == 0 { 0 } else { (n + T as u64 - 1) / T as u64 };
        let nsuper = if nblocks == 0 { 0 } else { (nblocks + F - 1) / F };

        let mut class_codes = BitBuffer::with_capacity(nblocks * BITS_PER_CLASS as u64);
        let mut offset_codes = BitBuffer::new();
        let mut rank_ef = EliasFanoBuilder::new(nsuper, n);
        // A block's offset never needs more than T bits, so nblocks * T
        // bounds the total length of offset_codes.
        let mut offset_pos_ef = EliasFanoBuilder::new(nsuper, nblocks * T as u64);

        let mut rank_sum = 0u64;
        for i in 0..nblocks {
            if i % F == 0 {
                rank_ef.push(rank_sum).expect("rank sample within declared bounds");
                offset_pos_ef
                    .push(offset_codes.len())
                    .expect("offset-position sample within declared bounds");
            }

            let block = fetch_block_bits(source, i * T as u64);
            let class = block.count_ones() as u8;
            rank_sum += class as u64;

            class_codes
                .push(class as u64, BITS_PER_CLASS)
                .expect("class always fits in 6 bits");

            let offset = offset_of(block, class);
            let width = bits_for_offset(class);
            offset_codes
                .push(offset, width)
                .expect("offset always fits its computed width");

            debug_assert_eq!(
                of_offset(offset, class),
                block,
                "enumerative coding must round-trip for every block"
            );
        }

        RrrBitVec {
            n,
            s1: rank_sum,
            class_codes,
            offset_codes,
            rank_samples: rank_ef.build(),
            offset_pos_samples: offset_pos_ef.build(),
        }
    }

    /// The number of bits in the vector.
    #[inline]
    pub fn len(&self) -> u64 {
        self.n
    }

    /// Whether the vector has no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The number of 1-bits.
    #[inline]
    pub fn count_ones(&self) -> u64 {
        self.s1
    }

    /// The number of 0-bits.
    #[inline]
    pub fn count_zeros(&self) -> u64 {
        self.n - self.s1
    }

    /// The number of bits equal to `b`.
    #[inline]
    pub fn size(&self, b: bool) -> u64 {
        if b {
            self.s1
        } else {
            self.n - self.s1
        }
    }

    fn class_of_block(&self, i: u64) -> u8 {
        self.class_codes
            .fetch64(i * BITS_PER_CLASS as u64, BITS_PER_CLASS)
            .expect("class_codes width is always BITS_PER_CLASS") as u8
    }

    fn offset_pos_of_block(&self, i: u64) -> u64 {
        let sb = i / F;
        let mut p = self.offset_pos_samples.get(sb);
        for j in sb * F..i {
            p += bits_for_offset(self.class_of_block(j)) as u64;
        }
        p
    }

    /// Returns `(class, decoded block)` for block `i`, short-circuiting
    /// the all-zero and all-one classes without touching `offset_codes`.
    fn fetch_block(&self, i: u64) -> (u8, u64) {
        let class = self.class_of_block(i);
        if class == 0 {
            return (class, 0);
        }
        if class as usize == T {
            return (class, (1u64 << T) - 1);
        }
        let pos = self.offset_pos_of_block(i);
        let width = bits_for_offset(class);
        let offset = self
            .offset_codes
            .fetch64(pos, width)
            .expect("offset_codes width matches bits_for_offset(class)");
        (class, of_offset(offset, class))
    }

    /// Reads bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn get(&self, i: u64) -> bool {
        assert!(
            i < self.n,
            "RrrBitVec::get: index {} out of bounds for length {}",
            i,
            self.n
        );
        let b = i / T as u64;
        let (class, block) = self.fetch_block(b);
        if class == 0 {
            return false;
        }
        if class as usize == T {
            return true;
        }
        let p = i % T as u64;
        (block >> (T as u64 - 1 - p)) & 1 == 1
    }

    /// Counts bits equal to `b` in `[0, i)`.
    ///
    /// # Panics
    ///
    /// Panics if `i > len()`.
    pub fn rank(&self, i: u64, b: bool) -> u64 {
        assert!(
            i <= self.n,
            "RrrBitVec::rank: index {} out of bounds for length {}",
            i,
            self.n
        );
        let rank1 = self.rank1(i);
        if b {
            rank1
        } else {
            i - rank1
        }
    }

    fn rank1(&self, i: u64) -> u64 {
        if i == 0 {
            return 0;
        }
        let nsuper = self.rank_samples.len();
        // i == n lands exactly on i / S == nsuper when n is a positive
        // multiple of S (the last super-block is full); clamp to the last
        // sample so the lookup below stays in bounds, matching
        // PlainBitVec::rank's i-1 indexing for the same "rank at n" case.
        let sb = (i / S).min(nsuper - 1);
        let base = self.rank_samples.get(sb);

        if sb + 1 < nsuper {
            let next = self.rank_samples.get(sb + 1);
            let delta = next - base;
            if delta == 0 {
                return base;
            }
            if delta == S {
                return base + (i - sb * S);
            }
        }

        let target_block = i / T as u64;
        let mut rank = base;
        for j in sb * F..target_block {
            rank += self.class_of_block(j) as u64;
        }

        let rem = i % T as u64;
        if rem > 0 {
            let (class, block) = self.fetch_block(target_block);
            if class as usize == T {
                rank += rem;
            } else if class > 0 {
                let mask = ((1u64 << rem) - 1) << (T as u64 - rem);
                rank += (block & mask).count_ones() as u64;
            }
        }
        rank
    }

    /// Returns the position of the `k`-th (0-indexed) bit equal to `b`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= size(b)`.
    pub fn select(&self, k: u64, b: bool) -> u64 {
        assert!(
            k < self.size(b),
            "RrrBitVec::select: index {} out of bounds for {} bits",
            k,
            if b { "one" } else { "zero" }
        );

        let nsuper = self.rank_samples.len();
        let adjusted = |j: u64| -> u64 {
            let r = self.rank_samples.get(j);
            if b {
                r
            } else {
                j * S - r
            }
        };

        let mut lo = 0u64;
        let mut hi = nsuper;
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            if adjusted(mid) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let sb = lo;
        let mut remaining = k - adjusted(sb);

        if sb + 1 < nsuper {
            let raw_base = self.rank_samples.get(sb);
            let raw_next = self.rank_samples.get(sb + 1);
            let delta = raw_next - raw_base;
            if delta == 0 && !b {
                return sb * S + remaining;
            }
            if delta == S && b {
                return sb * S + remaining;
            }
        }

        let mut idx = sb * F;
        loop {
            let class = self.class_of_block(idx);
            let cnt = if b { class as u64 } else { T as u64 - class as u64 };
            if remaining < cnt {
                break;
            }
            remaining -= cnt;
            idx += 1;
        }

        let (_, block) = self.fetch_block(idx);
        // Left-align the T-bit block to a full word, then bit-reverse so
        // intra-block position 0 (the block's MSB) lands at bit 0 — the
        // LSB-first order `select_in_word` expects, same convention as
        // crate::plain_bv. For b == false, select_in_word needs the zeros'
        // positions, so feed it the complement masked to T bits — the
        // complement of a left-aligned T-bit field has its high (64 - T)
        // bits set, which aren't real zero positions and must be excluded.
        let shifted = block << (64 - T as u32);
        let reversed = crate::broadword::reverse_bits(shifted);
        let word = if b {
            reversed
        } else {
            !reversed & ((1u64 << T) - 1)
        };
        let intra = crate::broadword::select_in_word(word, remaining as u32) as u64;
        idx * T as u64 + intra
    }

    /// Writes this vector's serialization: `n: u64`, `s1: u64`,
    /// `class_codes` (`BitBuffer`), `offset_codes` (`BitBuffer`),
    /// `rank_samples` (`EliasFanoSeq`), `offset_pos_samples`
    /// (`EliasFanoSeq`).
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        write_u64(w, self.n)?;
        write_u64(w, self.s1)?;
        self.class_codes.write_to(w)?;
        self.offset_codes.write_to(w)?;
        self.rank_samples.write_to(w)?;
        self.offset_pos_samples.write_to(w)?;
        Ok(())
    }

    /// Reads a vector written by [`RrrBitVec::write_to`].
    pub fn read_from(r: &mut impl Read) -> io::Result<Self> {
        let n = read_u64(r)?;
        let s1 = read_u64(r)?;
        let class_codes = BitBuffer::read_from(r)?;
        let offset_codes = BitBuffer::read_from(r)?;
        let rank_samples = EliasFanoSeq::read_from(r)?;
        let offset_pos_samples = EliasFanoSeq::read_from(r)?;
        Ok(RrrBitVec {
            n,
            s1,
            class_codes,
            offset_codes,
            rank_samples,
            offset_pos_samples,
        })
    }
}

impl crate::BitVector for RrrBitVec {
    #[inline]
    fn len(&self) -> u64 {
        RrrBitVec::len(self)
    }

    #[inline]
    fn get(&self, i: u64) -> bool {
        RrrBitVec::get(self, i)
    }

    #[inline]
    fn rank(&self, i: u64, b: bool) -> u64 {
        RrrBitVec::rank(self, i, b)
    }

    #[inline]
    fn select(&self, k: u64, b: bool) -> u64 {
        RrrBitVec::select(self, k, b)
    }
}

impl SpaceUsage for RrrBitVec {
    #[inline]
    fn is_stack_only() -> bool {
        false
    }

    fn heap_bytes(&self) -> usize {
        self.class_codes.heap_bytes()
            + self.offset_codes.heap_bytes()
            + self.rank_samples.heap_bytes()
            + self.offset_pos_samples.heap_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plain_bv::PlainBitVecBuilder;
    use quickcheck::quickcheck;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn build_from_bools(bits: &[bool]) -> RrrBitVec {
        let mut builder = RrrBitVecBuilder::new();
        for (i, &b) in bits.iter().enumerate() {
            builder.set(i as u64, b);
        }
        builder.build()
    }

    #[test]
    fn empty_vector() {
        let rrr = build_from_bools(&[]);
        assert_eq!(rrr.len(), 0);
        assert_eq!(rrr.rank(0, true), 0);
    }

    #[test]
    fn all_zero_and_all_one() {
        let zeros = build_from_bools(&vec![false; 5000]);
        assert_eq!(zeros.count_ones(), 0);
        assert_eq!(zeros.select(100, false), 100);

        let ones = build_from_bools(&vec![true; 5000]);
        assert_eq!(ones.count_ones(), 5000);
        assert_eq!(ones.select(4999, true), 4999);
    }

    /// S1: set bits at listed positions in a 3001-bit vector.
    #[test]
    fn s1_listed_positions() {
        let positions = [0u64, 511, 512, 1000, 2000, 2015, 2016, 2017, 3000];
        let bits: Vec<bool> = (0..3001u64).map(|i| positions.contains(&i)).collect();
        let rrr = build_from_bools(&bits);

        for (k, &p) in positions.iter().enumerate() {
            assert_eq!(rrr.select(k as u64, true), p);
        }
        assert_eq!(rrr.rank(3001, true), 9);
        assert!(rrr.get(2016));
        assert!(rrr.get(2015));
    }

    #[test]
    fn boundary_sizes() {
        for &n in &[0u64, 1, 62, 63, 64, 2016, 2017, 2018, 4032] {
            let bits: Vec<bool> = (0..n).map(|i| i % 5 == 0 || i % 7 == 0).collect();
            let rrr = build_from_bools(&bits);
            let ones = bits.iter().filter(|&&b| b).count() as u64;
            assert_eq!(rrr.count_ones(), ones);
            for i in 0..n {
                assert_eq!(rrr.get(i), bits[i as usize]);
            }
        }
    }

    /// A single set bit in a block (class 1): select0 must locate zeros
    /// within the block, not reuse the ones' positions.
    #[test]
    fn select_zero_within_mixed_block() {
        let mut bits = vec![false; T];
        bits[0] = true;
        let rrr = build_from_bools(&bits);
        assert_eq!(rrr.select(0, false), 1);
        assert_eq!(rrr.select(1, false), 2);
        assert_eq!(rrr.select((T - 2) as u64, false), (T - 1) as u64);
    }

    /// select0/select1 agree with a naive scan across several mixed-class
    /// blocks, not just the short-circuited all-0/all-1 ones.
    #[test]
    fn select_zero_across_mixed_blocks() {
        let n = 5 * T as u64;
        let bits: Vec<bool> = (0..n).map(|i| i % 3 == 0).collect();
        let rrr = build_from_bools(&bits);
        let zero_positions: Vec<u64> = (0..n).filter(|&i| !bits[i as usize]).collect();
        for (k, &p) in zero_positions.iter().enumerate() {
            assert_eq!(rrr.select(k as u64, false), p);
        }
    }

    /// `rank(n, _)` must not panic when `n` is a positive multiple of `S`
    /// (the last super-block is exactly full, so `i / S == nsuper`).
    #[test]
    fn rank_at_full_super_block_boundary() {
        for &nblocks_mult in &[1u64, 2] {
            let n = nblocks_mult * S;
            let bits: Vec<bool> = (0..n).map(|i| i % 5 == 0).collect();
            let rrr = build_from_bools(&bits);
            let ones = bits.iter().filter(|&&b| b).count() as u64;
            assert_eq!(rrr.rank(n, true), ones);
            assert_eq!(rrr.rank(n, false), n - ones);
        }
    }

    /// S4/S7: PlainBitVec and RrrBitVec agree on every index for the
    /// same random input.
    #[test]
    fn s4_s7_matches_plain_bit_vec() {
        let mut rng = StdRng::seed_from_u64(0x5eed_1234);
        let bits: Vec<bool> = (0..10_000).map(|_| rng.gen()).collect();

        let mut plain_builder = PlainBitVecBuilder::new();
        for &b in &bits {
            plain_builder.push_bit(b);
        }
        let plain = plain_builder.build();
        let rrr = build_from_bools(&bits);

        for i in 0..=bits.len() as u64 {
            assert_eq!(plain.rank(i, true), rrr.rank(i, true), "rank1 mismatch at {}", i);
            assert_eq!(plain.rank(i, false), rrr.rank(i, false), "rank0 mismatch at {}", i);
        }
        for k in 0..plain.count_ones() {
            assert_eq!(plain.select(k, true), rrr.select(k, true), "select1 mismatch at {}", k);
        }
        for k in 0..plain.count_zeros() {
            assert_eq!(plain.select(k, false), rrr.select(k, false), "select0 mismatch at {}", k);
        }
    }

    /// S5: serialize/deserialize and check equality plus query agreement.
    #[test]
    fn s5_serialization_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        let bits: Vec<bool> = (0..10_000).map(|_| rng.gen()).collect();
        let rrr = build_from_bools(&bits);

        let mut bytes = Vec::new();
        rrr.write_to(&mut bytes).unwrap();
        let back = RrrBitVec::read_from(&mut bytes.as_slice()).unwrap();

        assert_eq!(rrr, back);
        for i in 0..bits.len() as u64 {
            assert_eq!(rrr.get(i), back.get(i));
        }
    }

    #[test]
    fn quickcheck_rank_select_agree_with_naive() {
        fn prop(raw: Vec<bool>) -> bool {
            let rrr = build_from_bools(&raw);
            for i in 0..=raw.len() as u64 {
                let want1 = raw[..i as usize].iter().filter(|&&b| b).count() as u64;
                if rrr.rank(i, true) != want1 {
                    return false;
                }
            }
            for b in [true, false] {
                let size = rrr.size(b);
                for k in 0..size {
                    let pos = rrr.select(k, b);
                    if raw[pos as usize] != b {
                        return false;
                    }
                    if rrr.rank(pos, b) != k {
                        return false;
                    }
                }
            }
            true
        }
        quickcheck(prop as fn(Vec<bool>) -> bool);
    }

    #[test]
    #[should_panic]
    fn get_out_of_bounds_panics() {
        let rrr = build_from_bools(&[true, false]);
        rrr.get(2);
    }

    #[test]
    #[should_panic]
    fn rank_out_of_bounds_panics() {
        let rrr = build_from_bools(&[true, false]);
        rrr.rank(3, true);
    }

    #[test]
    #[should_panic]
    fn select_out_of_bounds_panics() {
        let rrr = build_from_bools(&[true, false]);
        rrr.select(1, true);
    }
}
