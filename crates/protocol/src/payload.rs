use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// Compress `bytes` as a single zlib stream.
///
/// `out` is cleared first and receives the compressed bytes; passing the same
/// vector on every call keeps its allocation.
pub fn compress_zlib(bytes: &[u8], out: Vec<u8>) -> io::Result<Vec<u8>> {
    let mut out = out;
    out.clear();

    let mut encoder = ZlibEncoder::new(out, Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

pub fn decompress_zlib(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::with_capacity(bytes.len() * 2);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
