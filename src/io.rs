//! Shared little-endian read/write helpers for the serialization format.
//!
//! Every structure's `write_to`/`read_from` is a mechanical sequence of
//! `u64`/`i32` fields followed by nested structures (see each module's
//! doc comment for the exact field order). Centralizing the primitive
//! reads and writes here, on top of `byteorder`, keeps those methods
//! free of repeated `ReadBytesExt`/`WriteBytesExt` boilerplate.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

#[inline]
pub fn write_u64(w: &mut impl Write, value: u64) -> io::Result<()> {
    w.write_u64::<LittleEndian>(value)
}

#[inline]
pub fn read_u64(r: &mut impl Read) -> io::Result<u64> {
    r.read_u64::<LittleEndian>()
}

#[inline]
pub fn write_i32(w: &mut impl Write, value: i32) -> io::Result<()> {
    w.write_i32::<LittleEndian>(value)
}

#[inline]
pub fn read_i32(r: &mut impl Read) -> io::Result<i32> {
    r.read_i32::<LittleEndian>()
}
