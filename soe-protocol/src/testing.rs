//! Deterministic session used by the unit tests.

use crate::session::SessionContext;
use bytes::{BufMut, Bytes, BytesMut};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Mutex;
use tracing::Level;

/// Marker placed in front of "compressed" payloads.
pub(crate) const COMPRESSED_MARKER: &[u8] = b"ZIP";

/// Key XORed into every byte of an "encrypted" payload.
pub(crate) const XOR_KEY: u8 = 0xAA;

/// Session with trivially inspectable transforms that records every log line.
pub(crate) struct RecordingSession {
    buffer_size: u32,
    compressable: bool,
    encrypted: bool,
    sequence: AtomicU16,
    logs: Mutex<Vec<(Level, String)>>,
}

impl RecordingSession {
    pub(crate) fn new(buffer_size: u32) -> Self {
        Self {
            buffer_size,
            compressable: false,
            encrypted: false,
            sequence: AtomicU16::new(0),
            logs: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_compression(mut self) -> Self {
        self.compressable = true;
        self
    }

    pub(crate) fn with_encryption(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub(crate) fn with_sequence(self, next: u16) -> Self {
        self.sequence.store(next, Ordering::SeqCst);
        self
    }

    /// Sequence number the next reliable packet will receive.
    pub(crate) fn peek_sequence(&self) -> u16 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub(crate) fn logs(&self) -> Vec<(Level, String)> {
        self.logs.lock().unwrap().clone()
    }

    /// `ZIP` followed by the input length (u32 BE).
    pub(crate) fn fake_compress(data: &[u8]) -> Bytes {
        let mut out = BytesMut::with_capacity(COMPRESSED_MARKER.len() + 4);
        out.put_slice(COMPRESSED_MARKER);
        out.put_u32(data.len() as u32);
        out.freeze()
    }

    pub(crate) fn fake_encrypt(data: &[u8]) -> Bytes {
        data.iter().map(|b| b ^ XOR_KEY).collect()
    }

    /// Byte sum of `data` as u16 BE.
    pub(crate) fn fake_crc(data: &[u8]) -> Bytes {
        let sum = data
            .iter()
            .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
        Bytes::copy_from_slice(&sum.to_be_bytes())
    }
}

impl SessionContext for RecordingSession {
    fn next_sequence_number(&self) -> u16 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    fn is_compressable(&self) -> bool {
        self.compressable
    }

    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn compress(&self, data: &[u8]) -> Bytes {
        Self::fake_compress(data)
    }

    fn encrypt(&self, data: &[u8]) -> Bytes {
        Self::fake_encrypt(data)
    }

    fn crc32_trailer(&self, data: &[u8]) -> Bytes {
        Self::fake_crc(data)
    }

    fn log(&self, level: Level, message: &str) {
        self.logs.lock().unwrap().push((level, message.to_string()));
    }
}
