//! Huffman coding engine.
//!
//! Version 0.1.0
//!
//! Builds an optimal prefix-free code from symbol frequencies, packs symbol sequences into a
//! compact bitstream with it and decodes them again. Symbols can be bytes, wider integers or
//! chars. The decoding tree can be stored as a small header, and a byte container wraps header
//! and bits into a self-contained file.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> huffman compress test.txt`
//!
//! This will compress the file and create the file test.txt.huf.
//! The original file is kept.
//!
//! Library use:
//!
//! ```
//! use huffman_codec::{decode, encode};
//!
//! let text: Vec<char> = "abracadabra".chars().collect();
//! let encoded = encode(&text).unwrap();
//! assert_eq!(decode(&encoded.tree, &encoded.stream).unwrap(), text);
//! ```
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use bitstream::bitpacker::{pack, PackedStream};
pub use bitstream::bitreader::unpack;
pub use compression::codec::{decode, decode_with_header, encode, encode_with, CodecOptions, Encoded};
pub use error::{HuffError, Result};
pub use huffman_coding::code_table::{assign, Code, CodeTable};
pub use huffman_coding::symbol::Symbol;
pub use huffman_coding::tree::{build, Node, Tree};
pub use tools::freq_count::FrequencyModel;
