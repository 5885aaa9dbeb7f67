//! Error types for the Huffman codec.

use thiserror::Error;

/// Everything the codec can report. All variants are structural problems with the input;
/// none of them are worth retrying.
#[derive(Debug, Error)]
pub enum HuffError {
    /// Empty or malformed frequency input (or an empty symbol sequence to encode).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A symbol to encode has no entry in the code table.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// A packed stream (or container) that ends mid-code or has inconsistent framing.
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    /// Decoding was attempted without a usable tree.
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// An I/O error occurred reading or writing a file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, HuffError>;
