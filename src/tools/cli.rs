use std::path::PathBuf;
use std::{fmt::Display, fmt::Formatter};

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

use crate::compression::codec::CodecOptions;

/// Table, Compress, Decompress, Roundtrip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Table,
    Compress,
    Decompress,
    Roundtrip,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Huffman coding of byte files and frequency tables",
    long_about = "
    Builds an optimal prefix-free code from symbol frequencies. The table command prints the
    code for a list of weighted characters. The compress and decompress commands code a file's
    bytes and store the decoding tree in front of the packed bits."
)]
pub struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Sets verbosity. -v0 is silent, -v5 is chatty
    #[clap(short = 'v', global = true, default_value_t = 3)]
    v: u8,

    /// Force overwriting output file
    #[clap(short = 'f', long = "force", global = true)]
    force: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the code table for a frequency file of `<symbol> <weight>` lines
    Table {
        #[clap(value_name = "FREQ_FILE")]
        file: PathBuf,
        /// Print canonical codes
        #[clap(long)]
        canonical: bool,
    },
    /// Compress a file, writing <FILE>.huf by default
    Compress {
        file: PathBuf,
        /// Output file name
        #[clap(short = 'o', long = "output")]
        output: Option<PathBuf>,
        /// Store canonical codes
        #[clap(long)]
        canonical: bool,
    },
    /// Decompress a .huf file
    Decompress {
        file: PathBuf,
        /// Output file name
        #[clap(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Compress and decompress a file in memory and compare
    Roundtrip {
        file: PathBuf,
        /// Use canonical codes
        #[clap(long)]
        canonical: bool,
    },
}

/// Everything the binary needs to know to do its job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HufOpts {
    /// What to do
    pub op_mode: Mode,
    /// File to read for input
    pub file: PathBuf,
    /// Optional file to write. None means the default name for the mode
    pub output: Option<PathBuf>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Codec settings
    pub codec: CodecOptions,
    /// Log level set from -v
    pub verbose: LevelFilter,
}

impl HufOpts {
    pub fn new() -> Self {
        Self {
            op_mode: Mode::Compress,
            file: PathBuf::new(),
            output: None,
            force_overwrite: false,
            codec: CodecOptions::default(),
            verbose: LevelFilter::Info,
        }
    }

    /// Put command line information from CLAP into our internal structure.
    pub fn from_args(args: Args) -> Self {
        let mut opts = Self::new();
        opts.force_overwrite = args.force;
        opts.verbose = match args.v {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        match args.command {
            Command::Table { file, canonical } => {
                opts.op_mode = Mode::Table;
                opts.file = file;
                opts.codec.canonical = canonical;
            }
            Command::Compress {
                file,
                output,
                canonical,
            } => {
                opts.op_mode = Mode::Compress;
                opts.file = file;
                opts.output = output;
                opts.codec.canonical = canonical;
            }
            Command::Decompress { file, output } => {
                opts.op_mode = Mode::Decompress;
                opts.file = file;
                opts.output = output;
            }
            Command::Roundtrip { file, canonical } => {
                opts.op_mode = Mode::Roundtrip;
                opts.file = file;
                opts.codec.canonical = canonical;
            }
        }
        opts
    }
}

impl Default for HufOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the command line, set the log level and report what we are about to do.
pub fn hufopts_init() -> HufOpts {
    let opts = HufOpts::from_args(Args::parse());
    log::set_max_level(opts.verbose);

    // Below we report initialization status to the user
    info!("---- Huffman Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Getting input from the file {}", opts.file.display());
    if let Some(output) = &opts.output {
        info!("Sending output to {}", output.display());
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.codec.canonical {
        info!("Using canonical codes")
    };
    info!("---- Huffman Initialization End ----\n");
    opts
}
