use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::codec::CodecOptions;
use super::container::{compress, decompress};
use crate::error::Result;

/// Extension given to compressed files.
pub const EXTENSION: &str = "huf";

/// Default name for the compressed copy of `input`: `<input>.huf`.
pub fn compressed_name(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

/// Default name for the restored copy of `input`: the `.huf` extension is dropped, anything
/// else gets `.out` appended.
pub fn decompressed_name(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == EXTENSION => input.with_extension(""),
        _ => {
            let mut name = input.as_os_str().to_owned();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}

/// Write `data` to `path`, refusing to replace an existing file unless `force` is set.
fn write_output(path: &Path, data: &[u8], force: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut f_out = options.open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            warn!("{} exists. Use -f to overwrite it.", path.display());
        }
        e
    })?;
    f_out.write_all(data)?;
    Ok(())
}

/// Compress `input` into `output` (default `<input>.huf`). Returns the output path.
pub fn compress_file(
    input: &Path,
    output: Option<&Path>,
    options: &CodecOptions,
    force: bool,
) -> Result<PathBuf> {
    let output = output.map_or_else(|| compressed_name(input), Path::to_path_buf);
    let data = fs::read(input)?;
    info!("Compressing {} ({} bytes)", input.display(), data.len());
    let packed = compress(&data, options)?;
    write_output(&output, &packed, force)?;
    info!("Wrote {} ({} bytes)", output.display(), packed.len());
    Ok(output)
}

/// Decompress `input` into `output` (see `decompressed_name` for the default). Returns the
/// output path.
pub fn decompress_file(input: &Path, output: Option<&Path>, force: bool) -> Result<PathBuf> {
    let output = output.map_or_else(|| decompressed_name(input), Path::to_path_buf);
    let data = fs::read(input)?;
    info!("Decompressing {} ({} bytes)", input.display(), data.len());
    let restored = decompress(&data)?;
    write_output(&output, &restored, force)?;
    info!("Wrote {} ({} bytes)", output.display(), restored.len());
    Ok(output)
}

/// Sizes seen by `roundtrip_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTrip {
    pub original: usize,
    pub compressed: usize,
    pub matches: bool,
}

/// Compress and decompress `input` in memory without writing anything.
pub fn roundtrip_file(input: &Path, options: &CodecOptions) -> Result<RoundTrip> {
    let data = fs::read(input)?;
    let packed = compress(&data, options)?;
    let restored = decompress(&packed)?;
    let report = RoundTrip {
        original: data.len(),
        compressed: packed.len(),
        matches: restored == data,
    };
    if !report.matches {
        warn!("{} did not survive the round trip!", input.display());
    }
    Ok(report)
}
