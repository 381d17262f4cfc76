//! A trait for computing space usage.
//!
//! Every succinct structure in this crate implements it so a caller can
//! measure the compression it's actually getting.

use std::mem;

/// Computes the space usage of an object.
///
/// The size is split into a stack portion (the statically-known size for
/// every object of the type) and a heap portion (additional heap
/// allocation that depends on run-time factors — e.g. a `Vec`'s backing
/// array).
pub trait SpaceUsage: Sized {
    /// Computes the size of the receiver in bytes, including any heap
    /// memory it owns.
    ///
    /// The default implementation returns
    /// `Self::stack_bytes() + self.heap_bytes()`.
    #[inline]
    fn total_bytes(&self) -> usize {
        Self::stack_bytes() + self.heap_bytes()
    }

    /// Is the size of this type known statically?
    ///
    /// If this returns true, `heap_bytes` should always return 0.
    fn is_stack_only() -> bool;

    /// The stack portion of the size of this type.
    ///
    /// The default implementation returns `std::mem::size_of::<Self>()`.
    #[inline]
    fn stack_bytes() -> usize {
        mem::size_of::<Self>()
    }

    /// The heap portion of the size of an object: memory owned by the
    /// object beyond its stack footprint.
    fn heap_bytes(&self) -> usize;
}

macro_rules! impl_stack_only_space_usage {
    ($ty:ty) => {
        impl SpaceUsage for $ty {
            #[inline]
            fn is_stack_only() -> bool {
                true
            }

            #[inline]
            fn heap_bytes(&self) -> usize {
                0
            }
        }
    };
}

impl_stack_only_space_usage!(());
impl_stack_only_space_usage!(bool);
impl_stack_only_space_usage!(u8);
impl_stack_only_space_usage!(u16);
impl_stack_only_space_usage!(u32);
impl_stack_only_space_usage!(u64);
impl_stack_only_space_usage!(usize);
impl_stack_only_space_usage!(i8);
impl_stack_only_space_usage!(i16);
impl_stack_only_space_usage!(i32);
impl_stack_only_space_usage!(i64);
impl_stack_only_space_usage!(isize);

impl<A: SpaceUsage> SpaceUsage for Vec<A> {
    #[inline]
    fn is_stack_only() -> bool {
        false
    }

    fn heap_bytes(&self) -> usize {
        let mut result = self.capacity() * A::stack_bytes();
        if !A::is_stack_only() {
            for each in self {
                result += each.heap_bytes();
            }
        }
        result
    }
}
