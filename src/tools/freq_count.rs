use log::{debug, trace};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{HuffError, Result};
use crate::huffman_coding::symbol::Symbol;

/// Inputs longer than this are counted in parallel.
const PARALLEL_THRESHOLD: usize = 64_000;
/// 16k is pretty much the sweet spot for chunk size.
const CHUNK_SIZE: usize = 16_000;

/// Occurrence count for each distinct symbol, kept in a fixed enumeration order. The order
/// matters: the tree builder breaks weight ties by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyModel<S> {
    entries: Vec<(S, u64)>,
}

impl<S: Symbol> FrequencyModel<S> {
    /// Build a model from (symbol, weight) pairs, keeping the order given. Zero weights are
    /// kept here and skipped by the tree builder. A repeated symbol is an error.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
    {
        let mut seen = FxHashSet::default();
        let mut entries = vec![];
        for (symbol, weight) in pairs {
            if !seen.insert(symbol) {
                return Err(HuffError::InvalidInput(format!(
                    "symbol {:?} appears more than once",
                    symbol
                )));
            }
            entries.push((symbol, weight));
        }
        Ok(Self { entries })
    }

    /// Count the occurrences of each symbol in `data`. The model lists symbols in ascending
    /// order so the result does not depend on where a symbol first shows up.
    pub fn from_symbols(data: &[S]) -> Self {
        let counts = if data.len() > PARALLEL_THRESHOLD {
            data.par_chunks(CHUNK_SIZE)
                .fold(|| FxHashMap::default(), |mut freqs, chunk| {
                    chunk.iter().for_each(|&s| *freqs.entry(s).or_insert(0_u64) += 1);
                    freqs
                })
                .reduce(|| FxHashMap::default(), |mut total, part| {
                    part.into_iter()
                        .for_each(|(s, n)| *total.entry(s).or_insert(0) += n);
                    total
                })
        } else {
            let mut freqs: FxHashMap<S, u64> = FxHashMap::default();
            data.iter().for_each(|&s| *freqs.entry(s).or_insert(0) += 1);
            freqs
        };

        let mut entries: Vec<(S, u64)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|&(s, _)| s);
        debug!(
            "Counted {} symbols, {} distinct.",
            data.len(),
            entries.len()
        );
        trace!("Frequencies: {:?}", entries);
        Self { entries }
    }

    /// Number of symbols in the model, including zero-weight ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of symbols that will receive a code.
    pub fn positive_count(&self) -> usize {
        self.entries.iter().filter(|&&(_, w)| w > 0).count()
    }

    pub fn weight(&self, symbol: S) -> Option<u64> {
        self.entries
            .iter()
            .find(|&&(s, _)| s == symbol)
            .map(|&(_, w)| w)
    }

    /// Sum of all weights. Wide enough that it cannot overflow.
    pub fn total_weight(&self) -> u128 {
        self.entries.iter().map(|&(_, w)| w as u128).sum()
    }

    /// (symbol, weight) pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (S, u64)> + '_ {
        self.entries.iter().copied()
    }
}

/// Parse a frequency list: one `<symbol> <weight>` pair per line. Blank lines and lines starting
/// with `#` are skipped. The symbol is a single character; `\s`, `\t` and `\n` name the
/// whitespace characters.
pub fn parse_frequency_list(text: &str) -> Result<FrequencyModel<char>> {
    let mut pairs = vec![];
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (sym, weight) = match (fields.next(), fields.next(), fields.next()) {
            (Some(sym), Some(weight), None) => (sym, weight),
            _ => {
                return Err(HuffError::InvalidInput(format!(
                    "line {}: expected `<symbol> <weight>`, found `{}`",
                    line_no + 1,
                    line
                )))
            }
        };
        let symbol = match sym {
            "\\s" => ' ',
            "\\t" => '\t',
            "\\n" => '\n',
            _ => {
                let mut chars = sym.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(HuffError::InvalidInput(format!(
                            "line {}: symbol `{}` is not a single character",
                            line_no + 1,
                            sym
                        )))
                    }
                }
            }
        };
        let weight = weight.parse::<u64>().map_err(|e| {
            HuffError::InvalidInput(format!(
                "line {}: bad weight `{}`: {}",
                line_no + 1,
                weight,
                e
            ))
        })?;
        pairs.push((symbol, weight));
    }
    FrequencyModel::from_pairs(pairs)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_symbols_sorts_test() {
        let model = FrequencyModel::from_symbols(&b"abracadabra"[..]);
        let pairs: Vec<(u8, u64)> = model.iter().collect();
        assert_eq!(
            pairs,
            vec![(b'a', 5), (b'b', 2), (b'c', 1), (b'd', 1), (b'r', 2)]
        );
        assert_eq!(model.total_weight(), 11);
        assert_eq!(model.weight(b'r'), Some(2));
        assert_eq!(model.weight(b'z'), None);
    }

    #[test]
    fn parallel_count_matches_test() {
        let data: Vec<u16> = (0..200_000_u32).map(|i| ((i * 7919) % 300) as u16).collect();
        let model = FrequencyModel::from_symbols(&data);

        let mut expected = vec![0_u64; 300];
        data.iter().for_each(|&s| expected[s as usize] += 1);
        let expected: Vec<(u16, u64)> = expected
            .into_iter()
            .enumerate()
            .filter(|&(_, n)| n > 0)
            .map(|(s, n)| (s as u16, n))
            .collect();

        assert_eq!(model.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn from_pairs_keeps_order_test() {
        let model = FrequencyModel::from_pairs(vec![('z', 3), ('a', 0), ('m', 9)]).unwrap();
        assert_eq!(
            model.iter().map(|(s, _)| s).collect::<String>(),
            "zam"
        );
        assert_eq!(model.len(), 3);
        assert_eq!(model.positive_count(), 2);
    }

    #[test]
    fn duplicate_symbol_test() {
        let result = FrequencyModel::from_pairs(vec![('a', 1), ('b', 2), ('a', 3)]);
        assert!(matches!(result, Err(HuffError::InvalidInput(_))));
    }

    #[test]
    fn parse_list_test() {
        let text = "# letters\nA 77\n\nB 17\n\\s 4\n";
        let model = parse_frequency_list(text).unwrap();
        assert_eq!(
            model.iter().collect::<Vec<_>>(),
            vec![('A', 77), ('B', 17), (' ', 4)]
        );
    }

    #[test]
    fn parse_list_errors_test() {
        assert!(matches!(
            parse_frequency_list("AB 3"),
            Err(HuffError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_frequency_list("A -3"),
            Err(HuffError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_frequency_list("A 3 4"),
            Err(HuffError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_frequency_list("A"),
            Err(HuffError::InvalidInput(_))
        ));
    }
}
