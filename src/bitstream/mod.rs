//! The bitstream module forms the I/O subsystem of the codec.
//!
//! Codes are written most significant bit first into bytes. The final byte is padded with
//! zeros, and the stream records how many of its bits are meaningful so a decoder never reads
//! the padding as data.
//!
pub mod bitpacker;
pub mod bitreader;
