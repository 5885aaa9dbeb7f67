//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::process::exit;

use huffman_codec::compression::files::{compress_file, decompress_file, roundtrip_file};
use huffman_codec::tools::cli::{hufopts_init, HufOpts, Mode};
use huffman_codec::tools::report::print_code_table;
use huffman_codec::{HuffError, Result};

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    // Available log levels are Error, Warn, Info, Debug, Trace. The -v option narrows this.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not start the logger: {}", e);
    }

    let options = hufopts_init();

    //----- Figure how what we need to do and go do it
    if let Err(e) = run(&options) {
        error!("{} failed: {}", options.op_mode, e);
        eprintln!("huffman: {}", e);
        exit(1);
    }
    info!("Done.\n");
}

fn run(options: &HufOpts) -> Result<()> {
    match options.op_mode {
        Mode::Table => print_code_table(&options.file, &options.codec),
        Mode::Compress => compress_file(
            &options.file,
            options.output.as_deref(),
            &options.codec,
            options.force_overwrite,
        )
        .map(|_| ()),
        Mode::Decompress => decompress_file(
            &options.file,
            options.output.as_deref(),
            options.force_overwrite,
        )
        .map(|_| ()),
        Mode::Roundtrip => {
            let report = roundtrip_file(&options.file, &options.codec)?;
            println!(
                "{}: {} bytes -> {} bytes ({:.1}%), round trip {}",
                options.file.display(),
                report.original,
                report.compressed,
                if report.original == 0 {
                    100.0
                } else {
                    report.compressed as f64 * 100.0 / report.original as f64
                },
                if report.matches { "ok" } else { "FAILED" }
            );
            if report.matches {
                Ok(())
            } else {
                Err(HuffError::MalformedStream(
                    "the restored data differs from the input".to_string(),
                ))
            }
        }
    }
}
