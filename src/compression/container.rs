//! Byte container for a compressed file.
//!
//! ```text
//! offset  size  field
//! 0       3     magic b"HUF"
//! 3       1     format version (1)
//! 4       1     flags, bit 0 = canonical codes
//! 5       1     valid bits in the last payload byte
//! 6       4     tree header length, u32 big-endian
//! 10      n     tree header
//! 10+n    ..    payload
//! ```
//!
//! An empty input is stored as a bare frame with no header and no payload.

use log::{debug, info};

use super::codec::{decode_with_header, encode_with, CodecOptions};
use crate::bitstream::bitpacker::{BitPacker, PackedStream};
use crate::bitstream::bitreader::BitReader;
use crate::error::{HuffError, Result};

pub const MAGIC: &[u8; 3] = b"HUF";
pub const VERSION: u8 = 1;
const FLAG_CANONICAL: u8 = 0b0000_0001;
const FRAME_LEN: usize = 10;

/// Compress `data` into a self-contained container.
pub fn compress(data: &[u8], options: &CodecOptions) -> Result<Vec<u8>> {
    let flags = if options.canonical { FLAG_CANONICAL } else { 0 };
    if data.is_empty() {
        debug!("Empty input, writing a bare frame.");
        return Ok(frame(flags, 0, 0));
    }

    let encoded = encode_with(data, options)?;
    let header = encoded.header();
    let header_len = u32::try_from(header.len()).map_err(|_| {
        HuffError::InvalidInput(format!("a {} byte tree header is too long", header.len()))
    })?;

    let mut out = frame(flags, encoded.stream.last_bits, header_len);
    out.reserve(header.len() + encoded.stream.data.len());
    out.extend_from_slice(&header);
    out.extend_from_slice(&encoded.stream.data);
    info!(
        "Compressed {} bytes to {} bytes ({} header, {} payload).",
        data.len(),
        out.len(),
        header.len(),
        encoded.stream.data.len()
    );
    Ok(out)
}

fn frame(flags: u8, last_bits: u8, header_len: u32) -> Vec<u8> {
    let mut bp = BitPacker::new(FRAME_LEN);
    MAGIC.iter().for_each(|&b| bp.out8(b));
    bp.out8(VERSION);
    bp.out8(flags);
    bp.out8(last_bits);
    bp.out32(header_len);
    bp.output
}

/// Restore the bytes stored by `compress`.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut br = BitReader::new(data);
    let malformed = |what: &str| HuffError::MalformedStream(format!("container {}", what));

    let magic = br.bytes(3).ok_or_else(|| malformed("is too short"))?;
    if magic != MAGIC {
        return Err(malformed("does not start with HUF"));
    }
    let version = br.byte().ok_or_else(|| malformed("is too short"))?;
    if version != VERSION {
        return Err(HuffError::MalformedStream(format!(
            "container version {} is not supported",
            version
        )));
    }
    let flags = br.byte().ok_or_else(|| malformed("is too short"))?;
    if flags & !FLAG_CANONICAL != 0 {
        return Err(HuffError::MalformedStream(format!(
            "unknown container flags {:#010b}",
            flags
        )));
    }
    let last_bits = br.byte().ok_or_else(|| malformed("is too short"))?;
    let header_len = br.bint(32).ok_or_else(|| malformed("is too short"))?;
    debug!(
        "Container v{}, flags {:#04b}, last_bits {}, header {} bytes.",
        version, flags, last_bits, header_len
    );

    let body = &data[FRAME_LEN..];
    if header_len > body.len() {
        return Err(HuffError::MalformedStream(format!(
            "header length {} runs past the end of the container",
            header_len
        )));
    }
    let (header, payload) = body.split_at(header_len);
    if header.is_empty() {
        if !payload.is_empty() || last_bits != 0 {
            return Err(malformed("holds a payload but no tree header"));
        }
        return Ok(vec![]);
    }

    let stream = PackedStream::new(payload.to_vec(), last_bits);
    let out: Vec<u8> = decode_with_header(header, &stream)?;
    info!("Decompressed {} bytes to {} bytes.", data.len(), out.len());
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_test() {
        let data = "It was the best of times, it was the worst of times.".as_bytes();
        for canonical in [false, true] {
            let packed = compress(data, &CodecOptions { canonical }).unwrap();
            assert_eq!(&packed[..3], MAGIC);
            assert_eq!(packed[4], canonical as u8);
            assert_eq!(decompress(&packed).unwrap(), data);
        }
    }

    #[test]
    fn empty_test() {
        let packed = compress(&[], &CodecOptions::default()).unwrap();
        assert_eq!(packed, [b'H', b'U', b'F', 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decompress(&packed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn single_byte_value_test() {
        let data = vec![7_u8; 20];
        let packed = compress(&data, &CodecOptions::default()).unwrap();
        // 20 zero bits: 3 bytes, 4 valid bits in the last one
        assert_eq!(packed[5], 4);
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn bad_frame_test() {
        let packed = compress(b"hello hello", &CodecOptions::default()).unwrap();

        let mut bad_magic = packed.clone();
        bad_magic[0] = b'X';
        let mut bad_version = packed.clone();
        bad_version[3] = 2;
        let mut bad_flags = packed.clone();
        bad_flags[4] = 0x80;
        let mut long_header = packed.clone();
        long_header[6..10].copy_from_slice(&u32::MAX.to_be_bytes());

        for bad in [
            &bad_magic[..],
            &bad_version[..],
            &bad_flags[..],
            &long_header[..],
            &packed[..7],
        ] {
            assert!(matches!(
                decompress(bad),
                Err(HuffError::MalformedStream(_))
            ));
        }
    }

    #[test]
    fn bad_last_bits_test() {
        let mut packed = compress(b"hello hello", &CodecOptions::default()).unwrap();
        packed[5] = 9;
        assert!(matches!(
            decompress(&packed),
            Err(HuffError::MalformedStream(_))
        ));
    }

    #[test]
    fn truncated_payload_test() {
        let packed = compress(b"mississippi river", &CodecOptions::default()).unwrap();
        let cut = &packed[..packed.len() - 1];
        // Losing a byte either cuts a code short or leaves a different but valid stream
        match decompress(cut) {
            Err(HuffError::MalformedStream(_)) => {}
            Ok(out) => assert_ne!(out, b"mississippi river"),
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
}
