//! Huffman tree construction.
//!
//! Leaves are seeded into a min-heap keyed by weight. The two lightest nodes are popped, joined
//! under a new internal node (first popped on the left, second on the right) and the new node
//! goes back on the heap, until a single root is left.
//!
//! Ties on weight are broken by a sequence number handed out at insertion: leaves are numbered
//! in the order the frequency model lists them, internal nodes in the order they are created.
//! The same model therefore always gives the same tree.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::{debug, trace};

use super::code_table::{Code, CodeTable};
use super::symbol::Symbol;
use crate::error::{HuffError, Result};
use crate::tools::freq_count::FrequencyModel;

/// A node of the tree. Internal nodes own both children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<S> {
    Leaf {
        symbol: S,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node<S>>,
        right: Box<Node<S>>,
    },
}

impl<S> Node<S> {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// A complete Huffman tree. Immutable once built, so it can be shared between decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree<S> {
    root: Node<S>,
}

impl<S: Symbol> Tree<S> {
    pub(crate) fn from_root(root: Node<S>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node<S> {
        &self.root
    }

    /// Total weight of the symbols under the root. Trees rebuilt from a header or a code table
    /// carry no weights and report 0.
    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Always `leaf_count() - 1`; a single-leaf tree has none.
    pub fn internal_count(&self) -> usize {
        self.leaf_count() - 1
    }

    /// Length of the longest root-to-leaf path. 0 for a single-leaf tree.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Rebuild a decoding tree from a prefix-free code table, e.g. one that was canonicalized.
    /// Each code is a path from the root (0 = left). The table must describe a full binary
    /// tree: every internal node needs both children. A one-entry table must hold the code `0`
    /// and gives a single leaf.
    pub fn from_code_table(table: &CodeTable<S>) -> Result<Self> {
        let mut entries = table.iter();
        let (first, first_code) = entries
            .next()
            .ok_or_else(|| HuffError::InvalidTree("the code table is empty".to_string()))?;
        if table.len() == 1 {
            if first_code != Code::new(0, 1) {
                return Err(HuffError::InvalidTree(format!(
                    "a single symbol must have the code 0, found {}",
                    first_code
                )));
            }
            return Ok(Self::from_root(Node::Leaf {
                symbol: first,
                weight: 0,
            }));
        }

        let mut root = Slot::Open;
        for (symbol, code) in table.iter() {
            root.insert(symbol, code)?;
        }
        Ok(Self::from_root(root.close()?))
    }
}

/// Build the Huffman tree for a frequency model. Zero-weight symbols get no leaf.
pub fn build<S: Symbol>(model: &FrequencyModel<S>) -> Result<Tree<S>> {
    if model.is_empty() {
        return Err(HuffError::InvalidInput(
            "the frequency model is empty".to_string(),
        ));
    }
    // Every internal weight is a partial sum of this, so one check covers all the merges.
    if model.total_weight() > u64::MAX as u128 {
        return Err(HuffError::InvalidInput(
            "the summed weights overflow a u64".to_string(),
        ));
    }

    let mut heap = BinaryHeap::with_capacity(model.len());
    let mut seq = 0;
    for (symbol, weight) in model.iter().filter(|&(_, w)| w > 0) {
        heap.push(Reverse(Pending {
            weight,
            seq,
            node: Node::Leaf { symbol, weight },
        }));
        seq += 1;
    }
    let leaves = heap.len();

    let root = loop {
        let Reverse(first) = heap.pop().ok_or_else(|| {
            HuffError::InvalidInput("no symbol has a positive weight".to_string())
        })?;
        let Reverse(second) = match heap.pop() {
            Some(node) => node,
            None => break first.node,
        };
        let weight = first.weight + second.weight;
        trace!(
            "merge #{} ({}) + #{} ({}) -> #{} ({})",
            first.seq,
            first.weight,
            second.seq,
            second.weight,
            seq,
            weight
        );
        heap.push(Reverse(Pending {
            weight,
            seq,
            node: Node::Internal {
                weight,
                left: Box::new(first.node),
                right: Box::new(second.node),
            },
        }));
        seq += 1;
    };

    let tree = Tree::from_root(root);
    debug!(
        "Built a tree with {} leaves, depth {}, weight {}.",
        leaves,
        tree.depth(),
        tree.weight()
    );
    Ok(tree)
}

/// A heap entry. Ordered by weight, then by insertion sequence.
#[derive(Debug)]
struct Pending<S> {
    weight: u64,
    seq: usize,
    node: Node<S>,
}

impl<S> PartialEq for Pending<S> {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl<S> Eq for Pending<S> {}

impl<S> PartialOrd for Pending<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for Pending<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Partially assembled tree used while inserting code paths.
enum Slot<S> {
    Open,
    Leaf(S),
    Branch(Box<Slot<S>>, Box<Slot<S>>),
}

impl<S: Symbol> Slot<S> {
    fn insert(&mut self, symbol: S, code: Code) -> Result<()> {
        let clash = || {
            HuffError::InvalidTree(format!(
                "the code {} of {:?} collides with another code",
                code, symbol
            ))
        };
        let mut slot = self;
        for i in 0..code.len() {
            if let Slot::Open = slot {
                *slot = Slot::Branch(Box::new(Slot::Open), Box::new(Slot::Open));
            }
            slot = match slot {
                Slot::Branch(left, right) => {
                    if code.bit(i) {
                        &mut **right
                    } else {
                        &mut **left
                    }
                }
                _ => return Err(clash()),
            };
        }
        match slot {
            Slot::Open => {
                *slot = Slot::Leaf(symbol);
                Ok(())
            }
            _ => Err(clash()),
        }
    }

    fn close(self) -> Result<Node<S>> {
        match self {
            Slot::Open => Err(HuffError::InvalidTree(
                "the code table leaves part of the tree unused".to_string(),
            )),
            Slot::Leaf(symbol) => Ok(Node::Leaf { symbol, weight: 0 }),
            Slot::Branch(left, right) => Ok(Node::Internal {
                weight: 0,
                left: Box::new(left.close()?),
                right: Box::new(right.close()?),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn model(pairs: &[(char, u64)]) -> FrequencyModel<char> {
        FrequencyModel::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn leaf_symbols(node: &Node<char>, out: &mut String) {
        match node {
            Node::Leaf { symbol, .. } => out.push(*symbol),
            Node::Internal { left, right, .. } => {
                leaf_symbols(left, out);
                leaf_symbols(right, out);
            }
        }
    }

    #[test]
    fn empty_model_test() {
        let result = build(&model(&[]));
        assert!(matches!(result, Err(HuffError::InvalidInput(_))));
    }

    #[test]
    fn all_zero_weights_test() {
        let result = build(&model(&[('a', 0), ('b', 0)]));
        assert!(matches!(result, Err(HuffError::InvalidInput(_))));
    }

    #[test]
    fn overflow_test() {
        let result = build(&model(&[('a', u64::MAX), ('b', 1)]));
        assert!(matches!(result, Err(HuffError::InvalidInput(_))));
    }

    #[test]
    fn single_symbol_test() {
        let tree = build(&model(&[('x', 5), ('y', 0)])).unwrap();
        assert_eq!(
            tree.root(),
            &Node::Leaf {
                symbol: 'x',
                weight: 5
            }
        );
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.internal_count(), 0);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn merge_order_test() {
        // B(17) + C(32) = 49, D(42) + 49 = 91, A(77) + 91 = 168, E(120) + 168 = 288
        let tree = build(&model(&[
            ('A', 77),
            ('B', 17),
            ('C', 32),
            ('D', 42),
            ('E', 120),
        ]))
        .unwrap();
        assert_eq!(tree.weight(), 288);
        assert_eq!(tree.leaf_count(), 5);
        assert_eq!(tree.internal_count(), 4);
        assert_eq!(tree.depth(), 4);

        let mut order = String::new();
        leaf_symbols(tree.root(), &mut order);
        assert_eq!(order, "EADBC");
    }

    #[test]
    fn ties_follow_insertion_order_test() {
        // All equal: a+b first, then c+d, then the two pairs in creation order.
        let tree = build(&model(&[('a', 1), ('b', 1), ('c', 1), ('d', 1)])).unwrap();
        let mut order = String::new();
        leaf_symbols(tree.root(), &mut order);
        assert_eq!(order, "abcd");

        let tree = build(&model(&[('d', 1), ('c', 1), ('b', 1), ('a', 1)])).unwrap();
        let mut order = String::new();
        leaf_symbols(tree.root(), &mut order);
        assert_eq!(order, "dcba");
    }

    #[test]
    fn internal_node_wins_late_tie_test() {
        // a+b = 2 ties with leaf c(2); c was inserted first so it is popped first (left).
        let tree = build(&model(&[('a', 1), ('b', 1), ('c', 2)])).unwrap();
        let mut order = String::new();
        leaf_symbols(tree.root(), &mut order);
        assert_eq!(order, "cab");
    }

    #[test]
    fn from_code_table_test() {
        let tree = build(&model(&[('a', 5), ('b', 2), ('c', 1), ('d', 1)])).unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();
        let rebuilt = Tree::from_code_table(&table).unwrap();
        assert_eq!(CodeTable::from_tree(&rebuilt).unwrap(), table);
        assert_eq!(rebuilt.weight(), 0);
    }

    #[test]
    fn from_code_table_incomplete_test() {
        let table = CodeTable::from_entries(vec![('a', Code::new(0, 1)), ('b', Code::new(2, 2))])
            .unwrap();
        assert!(matches!(
            Tree::from_code_table(&table),
            Err(HuffError::InvalidTree(_))
        ));
    }

    #[test]
    fn from_code_table_clash_test() {
        let table = CodeTable::from_entries(vec![
            ('a', Code::new(0, 1)),
            ('b', Code::new(1, 2)),
            ('c', Code::new(1, 1)),
        ])
        .unwrap();
        assert!(matches!(
            Tree::from_code_table(&table),
            Err(HuffError::InvalidTree(_))
        ));
    }
}
