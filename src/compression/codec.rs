use log::{debug, info};

use crate::bitstream::bitpacker::{pack, PackedStream};
use crate::bitstream::bitreader::unpack;
use crate::error::{HuffError, Result};
use crate::huffman_coding::code_table::CodeTable;
use crate::huffman_coding::header;
use crate::huffman_coding::symbol::Symbol;
use crate::huffman_coding::tree::{build, Tree};
use crate::tools::freq_count::FrequencyModel;

/// Settings for an encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    /// Replace the tree's codes with canonical codes of the same lengths.
    pub canonical: bool,
}

/// Everything an encode produces. The tree is what a decoder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded<S: Symbol> {
    pub tree: Tree<S>,
    pub table: CodeTable<S>,
    pub stream: PackedStream,
}

impl<S: Symbol> Encoded<S> {
    /// The tree as header bytes, for storing next to the stream.
    pub fn header(&self) -> Vec<u8> {
        header::serialize(&self.tree)
    }
}

/// Encode `symbols` with a code built from their own frequencies.
pub fn encode<S: Symbol>(symbols: &[S]) -> Result<Encoded<S>> {
    encode_with(symbols, &CodecOptions::default())
}

/// Encode `symbols`, honoring `options`.
pub fn encode_with<S: Symbol>(symbols: &[S], options: &CodecOptions) -> Result<Encoded<S>> {
    if symbols.is_empty() {
        return Err(HuffError::InvalidInput(
            "there is nothing to encode".to_string(),
        ));
    }
    let model = FrequencyModel::from_symbols(symbols);
    let mut tree = build(&model)?;
    let mut table = CodeTable::from_tree(&tree)?;
    if options.canonical {
        table = table.canonical();
        // The decoder walks a tree, so it has to match the new codes.
        tree = Tree::from_code_table(&table)?;
        debug!("Switched to canonical codes.");
    }
    let stream = pack(symbols, &table)?;
    info!(
        "Encoded {} symbols ({} distinct) into {} bytes, longest code {} bits.",
        symbols.len(),
        table.len(),
        stream.data.len(),
        table.max_len()
    );
    Ok(Encoded {
        tree,
        table,
        stream,
    })
}

/// Decode a stream with the tree it was encoded with.
pub fn decode<S: Symbol>(tree: &Tree<S>, stream: &PackedStream) -> Result<Vec<S>> {
    let symbols = unpack(stream, Some(tree))?;
    info!(
        "Decoded {} symbols from {} bytes.",
        symbols.len(),
        stream.data.len()
    );
    Ok(symbols)
}

/// Decode a stream whose tree was stored with `Encoded::header`.
pub fn decode_with_header<S: Symbol>(header: &[u8], stream: &PackedStream) -> Result<Vec<S>> {
    let tree = header::deserialize(header)?;
    decode(&tree, stream)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_test() {
        let text: Vec<char> = "she sells sea shells by the sea shore".chars().collect();
        let encoded = encode(&text).unwrap();
        assert!(encoded.table.is_prefix_free());
        assert_eq!(decode(&encoded.tree, &encoded.stream).unwrap(), text);
        assert_eq!(
            decode_with_header::<char>(&encoded.header(), &encoded.stream).unwrap(),
            text
        );
    }

    #[test]
    fn five_letters_test() {
        let mut input = Vec::new();
        for (symbol, count) in [('A', 77), ('B', 17), ('C', 32), ('D', 42), ('E', 120)] {
            input.extend(std::iter::repeat(symbol).take(count));
        }
        let encoded = encode(&input).unwrap();
        let table = &encoded.table;
        let shortest = table.iter().map(|(_, c)| c.len()).min().unwrap();
        assert_eq!(table.get('E').unwrap().len(), shortest);
        assert_eq!(table.get('B').unwrap().len(), table.max_len());
        assert_eq!(encoded.stream.bit_len(), 596);
        assert_eq!(decode(&encoded.tree, &encoded.stream).unwrap(), input);
    }

    #[test]
    fn single_symbol_test() {
        let encoded = encode(&['X', 'X', 'X']).unwrap();
        assert_eq!(encoded.table.get('X').unwrap().to_string(), "0");
        assert_eq!(encoded.stream, PackedStream::new(vec![0], 3));
        assert_eq!(
            decode(&encoded.tree, &encoded.stream).unwrap(),
            ['X', 'X', 'X']
        );
    }

    #[test]
    fn empty_input_test() {
        assert!(matches!(
            encode::<u8>(&[]),
            Err(HuffError::InvalidInput(_))
        ));
    }

    #[test]
    fn canonical_test() {
        let data = b"abracadabra, abracadabra, a magic word".to_vec();
        let plain = encode(&data).unwrap();
        let canonical = encode_with(&data, &CodecOptions { canonical: true }).unwrap();
        for (symbol, code) in plain.table.iter() {
            assert_eq!(canonical.table.get(symbol).unwrap().len(), code.len());
        }
        assert_eq!(plain.stream.bit_len(), canonical.stream.bit_len());
        assert_eq!(
            decode(&canonical.tree, &canonical.stream).unwrap(),
            data
        );
        assert_eq!(
            CodeTable::from_tree(&canonical.tree).unwrap(),
            canonical.table
        );
    }

    #[test]
    fn wrong_tree_test() {
        let encoded = encode(&b"aaaabbc"[..]).unwrap();
        let other = encode(&b"a"[..]).unwrap();
        // The single-leaf tree rejects any 1 bit in the stream.
        assert!(matches!(
            decode(&other.tree, &encoded.stream),
            Err(HuffError::MalformedStream(_))
        ));
    }
}
