//! zlib payload compression.

use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Compresses `data` into a zlib stream.
pub fn compress(data: &[u8]) -> std::io::Result<Bytes> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::default(),
    );
    encoder.write_all(data)?;
    Ok(Bytes::from(encoder.finish()?))
}

/// Inflates a zlib stream produced by [`compress`].
pub fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
    let mut decoder = flate2::write::ZlibDecoder::new(Vec::new());
    decoder.write_all(data)?;
    Ok(Bytes::from(decoder.finish()?))
}
