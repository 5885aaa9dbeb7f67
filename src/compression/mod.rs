//! The compression module ties the pieces together.
//!
//! Encoding happens in the following steps:
//! - Count the symbols to get a frequency model.
//! - Build the tree and assign a code to each symbol (optionally canonical).
//! - Pack the code of every input symbol into a bitstream.
//!
//! Decoding walks the tree bit by bit. The container adds a small frame with the tree header so
//! a compressed file is self-contained, and the files helpers read and write those files.
//!
pub mod codec;
pub mod container;
pub mod files;
