//! `EliasFanoSeq`: a succinct encoding of a non-decreasing sequence of
//! integers, using `n*ceil(log2(U/n)) + 2n + o(n)` bits.
//!
//! Each value's low `ℓ` bits go into a [`BitBuffer`]; its high part is
//! unary-coded as a single set bit in a [`PlainBitVec`], at a position
//! that advances monotonically with both the value and the index. This
//! is also the index substrate [`crate::rrr`] uses for its super-block
//! rank/offset-position samples.

use std::io::{self, Read, Write};

use crate::bit_buffer::BitBuffer;
use crate::error::{Error, Result};
use crate::io::{read_i32, read_u64, write_i32, write_u64};
use crate::plain_bv::{PlainBitVec, PlainBitVecBuilder};
use crate::space_usage::SpaceUsage;

fn low_bits_for(n_cap: u64, upper_bound: u64) -> u32 {
    if n_cap == 0 {
        return 0;
    }
    let ratio = upper_bound / n_cap;
    if ratio == 0 {
        0
    } else {
        63 - ratio.leading_zeros()
    }
}

/// Builder for an [`EliasFanoSeq`].
///
/// `push` must be called in non-decreasing order, up to the declared
/// capacity `n_cap` and upper bound `U` fixed at construction.
#[derive(Clone, Debug)]
pub struct EliasFanoBuilder {
    n_cap: u64,
    upper_bound: u64,
    low_bits: u32,
    mask: u64,
    lows: BitBuffer,
    highs: PlainBitVecBuilder,
    count: u64,
    last_val: u64,
}

impl EliasFanoBuilder {
    /// Creates a builder for a sequence of at most `n_cap` values, each
    /// in `[0, upper_bound]`.
    pub fn new(n_cap: u64, upper_bound: u64) -> Self {
        let low_bits = low_bits_for(n_cap, upper_bound);
        let mask = if low_bits == 0 { 0 } else { (1u64 << low_bits) - 1 };
        EliasFanoBuilder {
            n_cap,
            upper_bound,
            low_bits,
            mask,
            lows: BitBuffer::with_capacity(n_cap * low_bits as u64),
            highs: PlainBitVecBuilder::new(),
            count: 0,
            last_val: 0,
        }
    }

    /// Appends `v`, which must be `>=` the previously pushed value (if
    /// any) and `<= upper_bound`.
    ///
    /// Checks are applied in this order, matching the scenario where a
    /// value that is both out of order *and* beyond capacity reports the
    /// order violation:
    ///
    /// # Errors
    ///
    /// - [`Error::OrderViolation`] if `v` is less than the last pushed value.
    /// - [`Error::CapacityExceeded`] if this would exceed `n_cap` pushes.
    /// - [`Error::UpperBoundExceeded`] if `v > upper_bound`.
    pub fn push(&mut self, v: u64) -> Result<()> {
        if self.count > 0 && v < self.last_val {
            return Err(Error::OrderViolation {
                value: v,
                last: self.last_val,
            });
        }
        if self.count >= self.n_cap {
            return Err(Error::CapacityExceeded {
                capacity: self.n_cap,
            });
        }
        if v > self.upper_bound {
            return Err(Error::UpperBoundExceeded {
                value: v,
                upper_bound: self.upper_bound,
            });
        }

        let low = v & self.mask;
        self.lows.push(low, self.low_bits).expect("low_bits is always <= 64");

        let high = v >> self.low_bits;
        let target = high + self.count;
        let gap = target - self.highs.len();
        self.highs.push_runs(false, gap);
        self.highs.push_bit(true);

        self.count += 1;
        self.last_val = v;
        Ok(())
    }

    /// Finalizes the sequence, consuming the builder.
    pub fn build(self) -> EliasFanoSeq {
        EliasFanoSeq {
            n_cap: self.n_cap,
            upper_bound: self.upper_bound,
            low_bits: self.low_bits,
            mask: self.mask,
            count: self.count,
            last_val: self.last_val,
            lows: self.lows,
            highs: self.highs.build(),
        }
    }
}

/// An immutable, built, succinct non-decreasing integer sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EliasFanoSeq {
    n_cap: u64,
    upper_bound: u64,
    low_bits: u32,
    mask: u64,
    count: u64,
    last_val: u64,
    lows: BitBuffer,
    highs: PlainBitVec,
}

impl EliasFanoSeq {
    /// The number of values actually pushed (`<= n_cap`).
    #[inline]
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Whether no values were pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The declared capacity.
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.n_cap
    }

    /// The declared upper bound `U`.
    #[inline]
    pub fn upper_bound(&self) -> u64 {
        self.upper_bound
    }

    /// Returns the `i`-th stored value.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn get(&self, i: u64) -> u64 {
        assert!(
            i < self.count,
            "EliasFanoSeq::get: index {} out of bounds for length {}",
            i,
            self.count
        );
        let high = self.highs.select(i, true) - i;
        if self.low_bits == 0 {
            high
        } else {
            let low = self
                .lows
                .fetch64(i * self.low_bits as u64, self.low_bits)
                .expect("low_bits is always <= 64");
            (high << self.low_bits) | low
        }
    }

    /// Writes this sequence's serialization: `ℓ: i32`, `mask: u64`,
    /// `U: u64`, `n_cap: u64`, `count: u64`, `last_val: u64`, then
    /// `lows` (`BitBuffer` format), then `highs` (`PlainBitVec` format).
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        write_i32(w, self.low_bits as i32)?;
        write_u64(w, self.mask)?;
        write_u64(w, self.upper_bound)?;
        write_u64(w, self.n_cap)?;
        write_u64(w, self.count)?;
        write_u64(w, self.last_val)?;
        self.lows.write_to(w)?;
        self.highs.write_to(w)?;
        Ok(())
    }

    /// Reads a sequence written by [`EliasFanoSeq::write_to`].
    pub fn read_from(r: &mut impl Read) -> io::Result<Self> {
        let low_bits = read_i32(r)? as u32;
        let mask = read_u64(r)?;
        let upper_bound = read_u64(r)?;
        let n_cap = read_u64(r)?;
        let count = read_u64(r)?;
        let last_val = read_u64(r)?;
        let lows = BitBuffer::read_from(r)?;
        let highs = PlainBitVec::read_from(r)?;
        Ok(EliasFanoSeq {
            n_cap,
            upper_bound,
            low_bits,
            mask,
            count,
            last_val,
            lows,
            highs,
        })
    }
}

impl SpaceUsage for EliasFanoSeq {
    #[inline]
    fn is_stack_only() -> bool {
        false
    }

    fn heap_bytes(&self) -> usize {
        self.lows.heap_bytes() + self.highs.heap_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn empty_sequence() {
        let ef = EliasFanoBuilder::new(0, 0).build();
        assert_eq!(ef.len(), 0);
    }

    /// S2: monotone sequence with capacity/order/upper-bound violations.
    #[test]
    fn s2_monotone_sequence() {
        let values = [0u64, 0, 7, 7, 100, 1000, 99999];
        let n_cap = 7;
        let upper_bound = 99999;

        let mut builder = EliasFanoBuilder::new(n_cap, upper_bound);
        for &v in &values {
            builder.push(v).unwrap();
        }
        let ef = builder.build();
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(ef.get(i as u64), v);
        }

        // The declared capacity is already full, but order is checked first:
        // 99998 is less than the last pushed value (99999).
        let mut full = EliasFanoBuilder::new(n_cap, upper_bound);
        for &v in &values {
            full.push(v).unwrap();
        }
        assert_eq!(
            full.push(99998),
            Err(Error::OrderViolation {
                value: 99998,
                last: 99999
            })
        );

        // A value that's both in order and in-bounds, past capacity,
        // does report CapacityExceeded.
        let mut at_capacity = EliasFanoBuilder::new(n_cap, upper_bound);
        for &v in &values {
            at_capacity.push(v).unwrap();
        }
        assert_eq!(
            at_capacity.push(99999),
            Err(Error::CapacityExceeded { capacity: n_cap })
        );

        let mut order_violation = EliasFanoBuilder::new(2, upper_bound);
        order_violation.push(10).unwrap();
        assert_eq!(
            order_violation.push(5),
            Err(Error::OrderViolation { value: 5, last: 10 })
        );

        let mut bound_violation = EliasFanoBuilder::new(1, upper_bound);
        assert_eq!(
            bound_violation.push(100_000),
            Err(Error::UpperBoundExceeded {
                value: 100_000,
                upper_bound
            })
        );
    }

    #[test]
    fn zero_low_bits_when_n_cap_exceeds_upper_bound() {
        let mut builder = EliasFanoBuilder::new(10, 5);
        for v in [0u64, 1, 2, 3, 4, 5] {
            builder.push(v).unwrap();
        }
        let ef = builder.build();
        for v in 0..6u64 {
            assert_eq!(ef.get(v), v);
        }
    }

    #[test]
    fn quickcheck_monotone_round_trip() {
        fn prop(mut deltas: Vec<u16>) -> bool {
            deltas.truncate(200);
            let values: Vec<u64> = deltas
                .iter()
                .scan(0u64, |acc, &d| {
                    *acc += d as u64;
                    Some(*acc)
                })
                .collect();
            if values.is_empty() {
                return true;
            }
            let upper_bound = *values.last().unwrap();
            let mut builder = EliasFanoBuilder::new(values.len() as u64, upper_bound);
            for &v in &values {
                if builder.push(v).is_err() {
                    return false;
                }
            }
            let ef = builder.build();
            values.iter().enumerate().all(|(i, &v)| ef.get(i as u64) == v)
        }
        quickcheck(prop as fn(Vec<u16>) -> bool);
    }

    #[test]
    fn round_trip_serialization() {
        let mut builder = EliasFanoBuilder::new(5, 1000);
        for v in [3u64, 3, 50, 200, 999] {
            builder.push(v).unwrap();
        }
        let ef = builder.build();
        let mut bytes = Vec::new();
        ef.write_to(&mut bytes).unwrap();
        let back = EliasFanoSeq::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(ef, back);
    }

    #[test]
    #[should_panic]
    fn get_out_of_bounds_panics() {
        let ef = EliasFanoBuilder::new(0, 0).build();
        ef.get(0);
    }
}
