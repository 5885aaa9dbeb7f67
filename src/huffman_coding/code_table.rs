//! Code assignment: turns a tree into a table of bit strings, one per leaf.
//!
//! Walking left appends a 0, walking right appends a 1. A tree that is a single leaf has no
//! edges, so its only symbol gets the one-bit code `0`.
//!
//! Tables can also be made canonical: symbols are sorted by (code length, symbol) and handed
//! consecutive codes, shifting left whenever the length grows. Lengths (and so the compressed
//! size) do not change, only which bit pattern each symbol gets.

use std::fmt::{Display, Formatter};

use log::debug;
use rustc_hash::FxHashMap;

use super::symbol::Symbol;
use super::tree::{Node, Tree};
use crate::error::{HuffError, Result};
use crate::tools::freq_count::FrequencyModel;

/// Longest code a table can hold. A Huffman path of length d needs a total weight of at least
/// Fib(d + 2), so trees built from u64 weights stay under 92.
pub const MAX_CODE_LEN: u8 = 128;

/// A code of 1..=128 bits, right-aligned in `bits`; the first bit sent is the most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    bits: u128,
    len: u8,
}

impl Code {
    /// The empty path, only used while walking the tree.
    const ROOT: Code = Code { bits: 0, len: 0 };

    /// Build a code from its `len` low bits. Higher bits are dropped.
    pub fn new(bits: u128, len: u8) -> Self {
        assert!(len <= MAX_CODE_LEN, "code length {} over {}", len, MAX_CODE_LEN);
        let mask = if len == MAX_CODE_LEN {
            u128::MAX
        } else {
            (1_u128 << len) - 1
        };
        Self {
            bits: bits & mask,
            len,
        }
    }

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit `i` counted from the start of the code. Panics past the end.
    pub fn bit(&self, i: u8) -> bool {
        assert!(i < self.len);
        (self.bits >> (self.len - 1 - i)) & 1 == 1
    }

    /// The code extended by one bit, or None at the length limit.
    fn push(self, bit: bool) -> Option<Code> {
        if self.len == MAX_CODE_LEN {
            return None;
        }
        Some(Code {
            bits: self.bits << 1 | bit as u128,
            len: self.len + 1,
        })
    }

    /// True if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len > other.len {
            return false;
        }
        let shift = other.len - self.len;
        if shift == MAX_CODE_LEN {
            return true;
        }
        other.bits >> shift == self.bits
    }

    /// The bits left-aligned, for lexicographic ordering.
    fn aligned(&self) -> u128 {
        if self.len == 0 {
            0
        } else {
            self.bits << (MAX_CODE_LEN - self.len)
        }
    }

    pub fn iter_bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for bit in self.iter_bits() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Symbol -> code mapping with one entry per leaf. Iterates in ascending symbol order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<S: Symbol> {
    codes: FxHashMap<S, Code>,
    order: Vec<S>,
}

impl<S: Symbol> CodeTable<S> {
    /// Walk the tree and record the path to every leaf.
    pub fn from_tree(tree: &Tree<S>) -> Result<Self> {
        let mut leaves = Vec::with_capacity(tree.leaf_count());
        match tree.root() {
            Node::Leaf { symbol, .. } => leaves.push((*symbol, Code::new(0, 1))),
            root => collect_codes(root, Code::ROOT, &mut leaves)?,
        }
        let table = Self::from_entries(leaves)?;
        debug!(
            "Assigned {} codes, longest is {} bits.",
            table.len(),
            table.max_len()
        );
        Ok(table)
    }

    /// Canonical table from code lengths alone. The lengths must leave room for a prefix code
    /// (Kraft inequality), be 1..=128, and name each symbol once.
    pub fn from_lengths(lengths: &[(S, u8)]) -> Result<Self> {
        if lengths.is_empty() {
            return Err(HuffError::InvalidInput("no code lengths given".to_string()));
        }
        if let Some(&(s, len)) = lengths
            .iter()
            .find(|&&(_, len)| len == 0 || len > MAX_CODE_LEN)
        {
            return Err(HuffError::InvalidInput(format!(
                "code length {} for {:?} is out of range",
                len, s
            )));
        }

        let mut sorted = lengths.to_vec();
        sorted.sort_unstable_by_key(|&(s, len)| (len, s));

        // Count the free codes at each length. Once there are more than enough for every
        // remaining symbol the lengths cannot fail, so the count is capped there.
        let mut free: u128 = 1;
        let mut depth = 0;
        for (i, &(s, len)) in sorted.iter().enumerate() {
            while depth < len {
                free = (free * 2).min(sorted.len() as u128);
                depth += 1;
            }
            if free == 0 {
                return Err(HuffError::InvalidInput(format!(
                    "no room for a {} bit code for {:?}: the lengths break the Kraft inequality",
                    len, s
                )));
            }
            free -= 1;
            if free >= (sorted.len() - i - 1) as u128 {
                break;
            }
        }

        Self::from_entries(canonical_codes(&sorted))
    }

    /// The same code lengths, reassigned in canonical order.
    pub fn canonical(&self) -> Self {
        let mut sorted: Vec<(S, u8)> = self.iter().map(|(s, code)| (s, code.len())).collect();
        sorted.sort_unstable_by_key(|&(s, len)| (len, s));
        let codes = canonical_codes(&sorted);
        Self {
            order: self.order.clone(),
            codes: codes.into_iter().collect(),
        }
    }

    /// Build from (symbol, code) pairs. Only checks that each symbol appears once.
    pub(crate) fn from_entries(entries: Vec<(S, Code)>) -> Result<Self> {
        let mut codes = FxHashMap::default();
        codes.reserve(entries.len());
        for (symbol, code) in entries {
            if codes.insert(symbol, code).is_some() {
                return Err(HuffError::InvalidTree(format!(
                    "symbol {:?} has more than one code",
                    symbol
                )));
            }
        }
        let mut order: Vec<S> = codes.keys().copied().collect();
        order.sort_unstable();
        Ok(Self { codes, order })
    }

    pub fn get(&self, symbol: S) -> Option<Code> {
        self.codes.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// (symbol, code) pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (S, Code)> + '_ {
        self.order.iter().map(move |s| (*s, self.codes[s]))
    }

    pub fn max_len(&self) -> u8 {
        self.codes.values().map(|c| c.len()).max().unwrap_or(0)
    }

    /// Sum of weight x code length over the model's symbols: the number of bits needed to
    /// encode the data the model was counted from. Symbols without a code add nothing.
    pub fn weighted_path_length(&self, model: &FrequencyModel<S>) -> u128 {
        model
            .iter()
            .filter_map(|(s, w)| self.get(s).map(|code| w as u128 * code.len() as u128))
            .sum()
    }

    /// True if no code is a prefix of another. In lexicographic order a code can only be the
    /// prefix of its immediate successor, so one sorted pass is enough.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<Code> = self.codes.values().copied().collect();
        codes.sort_unstable_by_key(|c| (c.aligned(), c.len()));
        codes.windows(2).all(|w| !w[0].is_prefix_of(&w[1]))
    }
}

/// Alias for `CodeTable::from_tree`.
pub fn assign<S: Symbol>(tree: &Tree<S>) -> Result<CodeTable<S>> {
    CodeTable::from_tree(tree)
}

/// Recursively walk the tree, pushing (symbol, path) for every leaf into `leaves`.
fn collect_codes<S: Symbol>(node: &Node<S>, code: Code, leaves: &mut Vec<(S, Code)>) -> Result<()> {
    match node {
        Node::Leaf { symbol, .. } => leaves.push((*symbol, code)),
        Node::Internal { left, right, .. } => {
            let too_deep =
                || HuffError::InvalidTree(format!("a path is over {} bits", MAX_CODE_LEN));
            collect_codes(left, code.push(false).ok_or_else(too_deep)?, leaves)?;
            collect_codes(right, code.push(true).ok_or_else(too_deep)?, leaves)?;
        }
    }
    Ok(())
}

/// Assign canonical codes to (symbol, length) pairs already sorted by (length, symbol).
fn canonical_codes<S: Symbol>(sorted: &[(S, u8)]) -> Vec<(S, Code)> {
    let mut codes = Vec::with_capacity(sorted.len());
    let mut next: u128 = 0;
    let mut prev_len = match sorted.first() {
        Some(&(_, len)) => len,
        None => return codes,
    };
    for &(symbol, len) in sorted {
        next <<= len - prev_len;
        codes.push((symbol, Code::new(next, len)));
        next = next.wrapping_add(1);
        prev_len = len;
    }
    codes
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::huffman_coding::tree::build;

    fn table_for(pairs: &[(char, u64)]) -> CodeTable<char> {
        let model = FrequencyModel::from_pairs(pairs.iter().copied()).unwrap();
        CodeTable::from_tree(&build(&model).unwrap()).unwrap()
    }

    fn as_strings(table: &CodeTable<char>) -> Vec<(char, String)> {
        table.iter().map(|(s, c)| (s, c.to_string())).collect()
    }

    #[test]
    fn code_bits_test() {
        let code = Code::new(0b1011, 4);
        assert_eq!(code.to_string(), "1011");
        assert!(code.bit(0));
        assert!(!code.bit(1));
        assert_eq!(Code::new(0b111, 2), Code::new(0b11, 2));
        assert!(Code::new(0b10, 2).is_prefix_of(&code));
        assert!(!Code::new(0b11, 2).is_prefix_of(&code));
        assert!(!code.is_prefix_of(&Code::new(0b10, 2)));
        assert_eq!(Code::new(u128::MAX, 128).to_string().len(), 128);
    }

    #[test]
    fn five_letters_test() {
        let table = table_for(&[('A', 77), ('B', 17), ('C', 32), ('D', 42), ('E', 120)]);
        assert_eq!(
            as_strings(&table),
            vec![
                ('A', "10".to_string()),
                ('B', "1110".to_string()),
                ('C', "1111".to_string()),
                ('D', "110".to_string()),
                ('E', "0".to_string()),
            ]
        );
        assert!(table.is_prefix_free());
        assert_eq!(table.max_len(), 4);
    }

    #[test]
    fn single_symbol_gets_zero_test() {
        let table = table_for(&[('X', 5)]);
        assert_eq!(as_strings(&table), vec![('X', "0".to_string())]);
    }

    #[test]
    fn zero_weight_gets_no_code_test() {
        let table = table_for(&[('a', 3), ('b', 0), ('c', 1)]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get('b'), None);
    }

    #[test]
    fn weighted_path_length_test() {
        let pairs = [('A', 77), ('B', 17), ('C', 32), ('D', 42), ('E', 120)];
        let model = FrequencyModel::from_pairs(pairs.iter().copied()).unwrap();
        let table = CodeTable::from_tree(&build(&model).unwrap()).unwrap();
        // 77*2 + 17*4 + 32*4 + 42*3 + 120*1
        assert_eq!(table.weighted_path_length(&model), 596);
    }

    #[test]
    fn prefix_check_test() {
        let table = CodeTable::from_entries(vec![
            ('a', Code::new(0, 1)),
            ('b', Code::new(0b01, 2)),
        ])
        .unwrap();
        assert!(!table.is_prefix_free());
        let table = CodeTable::from_entries(vec![
            ('a', Code::new(0, 1)),
            ('b', Code::new(0, 1)),
        ])
        .unwrap();
        assert!(!table.is_prefix_free());
    }

    #[test]
    fn canonical_test() {
        let table = table_for(&[('A', 77), ('B', 17), ('C', 32), ('D', 42), ('E', 120)]);
        let canonical = table.canonical();
        assert_eq!(
            as_strings(&canonical),
            vec![
                ('A', "10".to_string()),
                ('B', "1110".to_string()),
                ('C', "1111".to_string()),
                ('D', "110".to_string()),
                ('E', "0".to_string()),
            ]
        );

        // Equal weights, reversed enumeration: the plain codes differ, the canonical ones don't.
        let forward = table_for(&[('a', 1), ('b', 1), ('c', 2)]);
        let backward = table_for(&[('c', 2), ('b', 1), ('a', 1)]);
        assert_ne!(forward, backward);
        assert_eq!(forward.canonical(), backward.canonical());
    }

    #[test]
    fn from_lengths_test() {
        let table = CodeTable::from_lengths(&[('a', 2), ('b', 1), ('c', 3), ('d', 3)]).unwrap();
        assert_eq!(
            as_strings(&table),
            vec![
                ('a', "10".to_string()),
                ('b', "0".to_string()),
                ('c', "110".to_string()),
                ('d', "111".to_string()),
            ]
        );
        assert!(table.is_prefix_free());
    }

    #[test]
    fn from_lengths_errors_test() {
        assert!(matches!(
            CodeTable::<char>::from_lengths(&[]),
            Err(HuffError::InvalidInput(_))
        ));
        assert!(matches!(
            CodeTable::from_lengths(&[('a', 1), ('b', 1), ('c', 1)]),
            Err(HuffError::InvalidInput(_))
        ));
        assert!(matches!(
            CodeTable::from_lengths(&[('a', 0)]),
            Err(HuffError::InvalidInput(_))
        ));
        assert!(matches!(
            CodeTable::from_lengths(&[('a', 1), ('a', 1)]),
            Err(HuffError::InvalidTree(_))
        ));
    }
}
