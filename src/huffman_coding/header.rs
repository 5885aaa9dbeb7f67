//! Tree header: the tree written in pre-order so a decoder can rebuild it without the weights.
//!
//! Each node takes one flag bit. `1` marks a leaf and is followed by the symbol's raw value in
//! `S::BITS` bits; `0` marks an internal node and is followed by its left subtree, then its right
//! subtree. The header is zero-padded to a whole byte.

use log::debug;
use rustc_hash::FxHashSet;

use super::code_table::MAX_CODE_LEN;
use super::symbol::Symbol;
use super::tree::{Node, Tree};
use crate::bitstream::bitpacker::BitPacker;
use crate::bitstream::bitreader::BitReader;
use crate::error::{HuffError, Result};

/// Append the tree to `bp`.
pub fn write_tree<S: Symbol>(tree: &Tree<S>, bp: &mut BitPacker) {
    write_node(tree.root(), bp);
}

fn write_node<S: Symbol>(node: &Node<S>, bp: &mut BitPacker) {
    match node {
        Node::Leaf { symbol, .. } => {
            bp.out_bit(true);
            bp.out_bits(symbol.to_raw(), S::BITS);
        }
        Node::Internal { left, right, .. } => {
            bp.out_bit(false);
            write_node(left, bp);
            write_node(right, bp);
        }
    }
}

/// The tree as header bytes.
pub fn serialize<S: Symbol>(tree: &Tree<S>) -> Vec<u8> {
    let leaves = tree.leaf_count();
    // One flag per node plus the symbol bits of each leaf.
    let bits = 2 * leaves - 1 + leaves * S::BITS as usize;
    let mut bp = BitPacker::new(bits / 8 + 1);
    write_tree(tree, &mut bp);
    bp.flush();
    debug!("Tree header is {} bytes for {} leaves.", bp.output.len(), leaves);
    bp.output
}

/// Read one tree from `br`. Leaves carry weight 0.
pub fn read_tree<S: Symbol>(br: &mut BitReader<'_>) -> Result<Tree<S>> {
    let mut seen = FxHashSet::default();
    let root = read_node(br, 0, &mut seen)?;
    Ok(Tree::from_root(root))
}

fn read_node<S: Symbol>(
    br: &mut BitReader<'_>,
    depth: u8,
    seen: &mut FxHashSet<S>,
) -> Result<Node<S>> {
    match br.bool_bit() {
        Some(true) => {
            let raw = match br.bint(S::BITS as usize) {
                Some(raw) => raw as u32,
                None => return Err(truncated(br)),
            };
            let symbol = S::from_raw(raw).ok_or_else(|| {
                HuffError::InvalidTree(format!("{:#x} is not a valid symbol", raw))
            })?;
            if !seen.insert(symbol) {
                return Err(HuffError::InvalidTree(format!(
                    "{:?} appears twice in the header",
                    symbol
                )));
            }
            Ok(Node::Leaf { symbol, weight: 0 })
        }
        Some(false) => {
            if depth >= MAX_CODE_LEN {
                return Err(HuffError::InvalidTree(format!(
                    "the header nests deeper than {} levels",
                    MAX_CODE_LEN
                )));
            }
            let left = read_node(br, depth + 1, seen)?;
            let right = read_node(br, depth + 1, seen)?;
            Ok(Node::Internal {
                weight: 0,
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        None => Err(truncated(br)),
    }
}

fn truncated(br: &BitReader<'_>) -> HuffError {
    HuffError::InvalidTree(format!("the header ends early at {}", br.loc()))
}

/// Rebuild a tree from header bytes. Anything after the tree besides the final pad bits is an
/// error.
pub fn deserialize<S: Symbol>(header: &[u8]) -> Result<Tree<S>> {
    let mut br = BitReader::new(header);
    let tree = read_tree(&mut br)?;
    if br.remaining() >= 8 {
        return Err(HuffError::InvalidTree(format!(
            "{} unused bits after the tree header",
            br.remaining()
        )));
    }
    Ok(tree)
}
