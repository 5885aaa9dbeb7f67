use std::fmt::Write;
use std::fs;
use std::path::Path;

use log::info;

use crate::compression::codec::CodecOptions;
use crate::error::Result;
use crate::huffman_coding::code_table::CodeTable;
use crate::huffman_coding::tree::build;
use crate::tools::freq_count::{parse_frequency_list, FrequencyModel};

/// Printable name of a character symbol.
fn symbol_name(symbol: char) -> String {
    match symbol {
        ' ' => "\\s".to_string(),
        '\t' => "\\t".to_string(),
        '\n' => "\\n".to_string(),
        c => c.to_string(),
    }
}

/// Lay out a code table one symbol per line, in model order, followed by the weighted path
/// length. Symbols with no code (zero weight) are listed with a `-` code.
pub fn format_code_table(model: &FrequencyModel<char>, table: &CodeTable<char>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8}{:>12}  {:<24}{:>8}{:>20}",
        "Symbol", "Weight", "Code", "Length", "Weight x Length"
    );
    for (symbol, weight) in model.iter() {
        match table.get(symbol) {
            Some(code) => {
                let _ = writeln!(
                    out,
                    "{:<8}{:>12}  {:<24}{:>8}{:>20}",
                    symbol_name(symbol),
                    weight,
                    code.to_string(),
                    code.len(),
                    weight as u128 * code.len() as u128
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{:<8}{:>12}  {:<24}{:>8}{:>20}",
                    symbol_name(symbol),
                    weight,
                    "-",
                    0,
                    0
                );
            }
        }
    }
    let _ = writeln!(
        out,
        "The weighted minimum path length is: {} bits",
        table.weighted_path_length(model)
    );
    out
}

/// Build the code table for the frequency list in `text`.
pub fn code_table_report(text: &str, options: &CodecOptions) -> Result<String> {
    let model = parse_frequency_list(text)?;
    let tree = build(&model)?;
    let mut table = CodeTable::from_tree(&tree)?;
    if options.canonical {
        table = table.canonical();
    }
    info!(
        "{} symbols, {} with codes, longest code {} bits",
        model.len(),
        table.len(),
        table.max_len()
    );
    Ok(format_code_table(&model, &table))
}

/// Read a frequency file and print its code table to stdout.
pub fn print_code_table(path: &Path, options: &CodecOptions) -> Result<()> {
    let text = fs::read_to_string(path)?;
    print!("{}", code_table_report(&text, options)?);
    Ok(())
}
