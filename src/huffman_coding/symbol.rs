//! The alphabet unit. Anything that can be compared, hashed and written as a fixed number of
//! raw bits in the tree header can be a symbol.

use std::fmt::Debug;
use std::hash::Hash;

/// A unit of the alphabet being compressed.
pub trait Symbol: Copy + Ord + Hash + Debug + Send + Sync {
    /// Number of bits used to store one symbol in the tree header (1..=32).
    const BITS: u8;

    /// Raw value written to the header. Must fit in `BITS` bits.
    fn to_raw(self) -> u32;

    /// Inverse of `to_raw`. Returns None if the raw value is not a valid symbol.
    fn from_raw(raw: u32) -> Option<Self>;
}

impl Symbol for u8 {
    const BITS: u8 = 8;

    fn to_raw(self) -> u32 {
        self as u32
    }

    fn from_raw(raw: u32) -> Option<Self> {
        u8::try_from(raw).ok()
    }
}

impl Symbol for u16 {
    const BITS: u8 = 16;

    fn to_raw(self) -> u32 {
        self as u32
    }

    fn from_raw(raw: u32) -> Option<Self> {
        u16::try_from(raw).ok()
    }
}

impl Symbol for u32 {
    const BITS: u8 = 32;

    fn to_raw(self) -> u32 {
        self
    }

    fn from_raw(raw: u32) -> Option<Self> {
        Some(raw)
    }
}

/// Unicode scalar values fit in 21 bits.
impl Symbol for char {
    const BITS: u8 = 21;

    fn to_raw(self) -> u32 {
        self as u32
    }

    fn from_raw(raw: u32) -> Option<Self> {
        char::from_u32(raw)
    }
}
