//! The huffman_coding module holds the code itself: symbols, the tree, the code table and the
//! tree header.
//!
//! A tree is built from a frequency model by repeatedly merging the two lightest nodes. Walking
//! the tree gives each symbol its code (0 for a left branch, 1 for a right branch), and no code
//! is a prefix of another. The table can optionally be rewritten into canonical form, which
//! keeps every code length but orders codes by (length, symbol).
//!
//! The header stores the shape of the tree and its leaf symbols so a decoder can rebuild it
//! without the weights.
//!
pub mod code_table;
pub mod header;
pub mod symbol;
pub mod tree;
