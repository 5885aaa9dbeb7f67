//! BitReader: reads a packed bitstream, most significant bit of each byte first.
//!
//! The reader can be limited to fewer bits than the buffer holds, so pad bits at the end of
//! the last byte are never seen. unpack() uses it to walk the tree one bit at a time.

use log::debug;

use crate::bitstream::bitpacker::PackedStream;
use crate::error::{HuffError, Result};
use crate::huffman_coding::symbol::Symbol;
use crate::huffman_coding::tree::{Node, Tree};

/// Reads bits from a byte slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    bit_index: usize,
    /// Number of readable bits from the start of the buffer.
    limit: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a reader over every bit of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_limit(buffer, buffer.len() * 8)
    }

    /// Creates a reader that stops after `bits` bits (or the end of the buffer if sooner).
    pub fn with_limit(buffer: &'a [u8], bits: usize) -> Self {
        Self {
            buffer,
            cursor: 0,
            bit_index: 0,
            limit: bits.min(buffer.len() * 8),
        }
    }

    fn position(&self) -> usize {
        self.cursor * 8 + self.bit_index
    }

    /// Bits left before the limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.position()
    }

    /// Return bit as Option<usize> (1 or 0), or None if there is no more data to read
    pub fn bit(&mut self) -> Option<usize> {
        if self.remaining() == 0 {
            return None;
        }
        let bit = (self.buffer[self.cursor] >> (7 - self.bit_index)) & 1;
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        Some(bit as usize)
    }

    /// Return Option<Bool> *true* if the next bit is 1, *false* if 0, consuming the bit,
    /// or None if there is no more data to read
    pub fn bool_bit(&mut self) -> Option<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Return Option<usize> of the next n bits (n <= 32), or None if fewer than n bits are
    /// left. Nothing is consumed on None.
    pub fn bint(&mut self, mut n: usize) -> Option<usize> {
        debug_assert!(n <= 32);
        if n > self.remaining() {
            return None;
        }
        let mut result = 0_usize;
        // Take what we need from the current byte, then move on to the next one.
        while n > 0 {
            let available = 8 - self.bit_index;
            let take = n.min(available);
            let bits = (self.buffer[self.cursor] as usize >> (available - take)) & ((1 << take) - 1);
            result = result << take | bits;
            self.bit_index += take;
            n -= take;
            if self.bit_index == 8 {
                self.bit_index = 0;
                self.cursor += 1;
            }
        }
        Some(result)
    }

    /// Returns a byte as an Option<u8>, or None if there is no more data to read. This is
    /// a convenience function, and calls bint(8).
    pub fn byte(&mut self) -> Option<u8> {
        self.bint(8).map(|byte| byte as u8)
    }

    /// Returns an Option<Vec<u8>> of n bytes, or None if fewer than n bytes are left.
    pub fn bytes(&mut self, n: usize) -> Option<Vec<u8>> {
        if n * 8 > self.remaining() {
            return None;
        }
        (0..n).map(|_| self.byte()).collect()
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}

/// Decode a packed stream by walking `tree`: 0 goes left, 1 goes right, and reaching a leaf
/// emits its symbol and starts over at the root. Exactly `stream.bit_len()` bits are read.
pub fn unpack<S: Symbol>(stream: &PackedStream, tree: Option<&Tree<S>>) -> Result<Vec<S>> {
    stream.validate()?;
    let tree = match tree {
        Some(tree) => tree,
        None if stream.is_empty() => return Ok(vec![]),
        None => {
            return Err(HuffError::InvalidTree(
                "no tree to decode a non-empty stream with".to_string(),
            ))
        }
    };

    let mut br = BitReader::with_limit(&stream.data, stream.bit_len());
    let root = tree.root();

    // A lone leaf was given the code 0, one bit per symbol.
    if let Node::Leaf { symbol, .. } = root {
        let mut out = Vec::with_capacity(br.remaining());
        while let Some(bit) = br.bit() {
            if bit != 0 {
                return Err(HuffError::MalformedStream(format!(
                    "a 1 bit at {} in a single-symbol stream",
                    br.loc()
                )));
            }
            out.push(*symbol);
        }
        return Ok(out);
    }

    let mut out = Vec::with_capacity(br.remaining() / tree.depth().max(1));
    let mut node = root;
    let mut depth = 0;
    while let Some(bit) = br.bool_bit() {
        // `node` is always internal here: leaves send us straight back to the root.
        if let Node::Internal { left, right, .. } = node {
            node = if bit { &**right } else { &**left };
            depth += 1;
        }
        if let Node::Leaf { symbol, .. } = node {
            out.push(*symbol);
            node = root;
            depth = 0;
        }
    }
    if depth != 0 {
        return Err(HuffError::MalformedStream(format!(
            "the stream ends {} bits into a code",
            depth
        )));
    }
    debug!(
        "Unpacked {} symbols from {} bits.",
        out.len(),
        stream.bit_len()
    );
    Ok(out)
}
