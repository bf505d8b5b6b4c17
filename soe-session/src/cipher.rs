//! SOE XOR chain cipher.
//!
//! The payload is processed in 4-byte little-endian blocks. Each block is
//! XORed with the running key, and the encrypted block becomes the key for the
//! next one. Bytes past the last full block are XORed with the low byte of the
//! final key.

use bytes::{BufMut, Bytes, BytesMut};

const BLOCK: usize = 4;

/// Encrypts `data` with `key`.
pub fn encrypt(key: u32, data: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(data.len());
    let mut key = key;
    let mut blocks = data.chunks_exact(BLOCK);
    for block in &mut blocks {
        let value = u32::from_le_bytes([block[0], block[1], block[2], block[3]]) ^ key;
        out.put_u32_le(value);
        key = value;
    }
    let tail = key as u8;
    out.extend(blocks.remainder().iter().map(|b| b ^ tail));
    out.freeze()
}

/// Reverses [`encrypt`].
pub fn decrypt(key: u32, data: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(data.len());
    let mut key = key;
    let mut blocks = data.chunks_exact(BLOCK);
    for block in &mut blocks {
        let value = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        out.put_u32_le(value ^ key);
        key = value;
    }
    let tail = key as u8;
    out.extend(blocks.remainder().iter().map(|b| b ^ tail));
    out.freeze()
}
