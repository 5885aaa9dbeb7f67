use log::{debug, error};

use crate::error::{HuffError, Result};
use crate::huffman_coding::code_table::{Code, CodeTable};
use crate::huffman_coding::symbol::Symbol;

/// Packed output of an encode: the code bits of every input symbol, back to back, most
/// significant bit first in each byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackedStream {
    pub data: Vec<u8>,
    /// Valid bits in the last byte of `data` (1..=8), or 0 when `data` is empty.
    pub last_bits: u8,
}

impl PackedStream {
    pub fn new(data: Vec<u8>, last_bits: u8) -> Self {
        Self { data, last_bits }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of meaningful bits. Only exact for a stream that passes `validate`.
    pub fn bit_len(&self) -> usize {
        match self.data.len() {
            0 => 0,
            n => (n - 1) * 8 + self.last_bits as usize,
        }
    }

    /// Check that `last_bits` agrees with `data`.
    pub fn validate(&self) -> Result<()> {
        let ok = if self.data.is_empty() {
            self.last_bits == 0
        } else {
            (1..=8).contains(&self.last_bits)
        };
        if ok {
            Ok(())
        } else {
            Err(HuffError::MalformedStream(format!(
                "{} valid bits declared for a final byte of a {} byte stream",
                self.last_bits,
                self.data.len()
            )))
        }
    }
}

/// Creates a bitstream for output.
#[derive(Debug)]
pub struct BitPacker {
    pub output: Vec<u8>,
    /// Valid bits in the last byte of `output`. Set as bytes are written and by flush().
    pub last_bits: u8,
    queue: u64,
    q_bits: u8,
}

impl BitPacker {
    /// Create a new BitPacker with an output buffer of size specified. Call flush() to flush
    /// the bit queue to the buffer before taking the output.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            last_bits: 0,
            queue: 0,
            q_bits: 0,
        }
    }

    /// Internal bitstream write function common to all out.XX functions.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
            self.last_bits = 8;
        }
    }

    /// Writes the `n` least significant bits of `data` (n <= 32).
    pub fn out_bits(&mut self, data: u32, n: u8) {
        debug_assert!(n <= 32);
        if n == 0 {
            return;
        }
        self.queue <<= n; //shift queue by bit length
        self.queue |= data as u64 & ((1_u64 << n) - 1); //add data portion to queue
        self.q_bits += n; //update depth of queue bits
        self.write_stream();
    }

    /// Puts a 32 bit word of pre-packed binary encoded data on the stream.
    pub fn out32(&mut self, data: u32) {
        self.out_bits(data, 32);
    }

    /// Puts a byte of pre-packed binary encoded data on the stream.
    pub fn out8(&mut self, data: u8) {
        self.out_bits(data as u32, 8);
    }

    /// Writes a single bit.
    pub fn out_bit(&mut self, bit: bool) {
        self.out_bits(bit as u32, 1);
    }

    /// Writes a whole code, 32 bits at a time.
    pub fn out_code(&mut self, code: Code) {
        let mut remaining = code.len();
        while remaining > 0 {
            let n = remaining.min(32);
            let chunk = (code.bits() >> (remaining - n)) as u32;
            self.out_bits(chunk, n);
            remaining -= n;
        }
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits
    pub fn flush(&mut self) {
        if self.q_bits > 0 {
            let valid = self.q_bits;
            self.queue <<= 8 - self.q_bits; //pad the queue with zeros
            self.q_bits += 8 - self.q_bits;
            self.write_stream(); // write out all that is left
            self.last_bits = valid;
            if self.q_bits > 0 {
                error!("Stuff left in the BitPacker queue.");
            }
        }
    }

    /// Flush and hand over the packed bytes.
    pub fn finish(mut self) -> PackedStream {
        self.flush();
        PackedStream::new(self.output, self.last_bits)
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format! {"[{}.{}]",((self.output.len() * 8) + self.q_bits as usize)/8, ((self.output.len() * 8) + self.q_bits as usize)%8}
    }
}

/// Pack `symbols` using `table`. Fails without output if any symbol has no code.
pub fn pack<S: Symbol>(symbols: &[S], table: &CodeTable<S>) -> Result<PackedStream> {
    let mut bp = BitPacker::new(symbols.len() / 2 + 1);
    for &symbol in symbols {
        let code = table.get(symbol).ok_or_else(|| {
            HuffError::UnknownSymbol(format!("{:?} is not in the code table", symbol))
        })?;
        bp.out_code(code);
    }
    let stream = bp.finish();
    debug!(
        "Packed {} symbols into {} bits ({} bytes).",
        symbols.len(),
        stream.bit_len(),
        stream.data.len()
    );
    Ok(stream)
}
