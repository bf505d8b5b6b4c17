//! Seeded CRC-32 trailers.
//!
//! The checksum is the IEEE CRC-32 of the seed's four little-endian bytes
//! followed by the packet bytes. Only the low `length` bytes are sent,
//! most significant first.

use bytes::Bytes;

/// Maximum trailer length; a CRC-32 has four bytes.
pub const MAX_CRC_LENGTH: u8 = 4;

/// Computes the seeded CRC-32 of `data`.
pub fn crc32(seed: u32, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(data);
    hasher.finalize()
}

/// Returns the `length` byte trailer for `data`.
///
/// `length` is clamped to [`MAX_CRC_LENGTH`].
pub fn trailer(seed: u32, length: u8, data: &[u8]) -> Bytes {
    let length = usize::from(length.min(MAX_CRC_LENGTH));
    let crc = crc32(seed, data).to_be_bytes();
    Bytes::copy_from_slice(&crc[crc.len() - length..])
}

/// Checks a received packet whose last `length` bytes are its trailer.
pub fn verify(seed: u32, length: u8, packet: &[u8]) -> bool {
    let length = usize::from(length.min(MAX_CRC_LENGTH));
    if packet.len() < length {
        return false;
    }
    let (body, received) = packet.split_at(packet.len() - length);
    trailer(seed, length as u8, body).as_ref() == received
}
