//! Per-connection framing context.

use crate::config::SessionConfig;
use crate::{checksum, cipher, compression};
use bytes::Bytes;
use soe_protocol::SessionContext;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use tracing::Level;
use uuid::Uuid;

/// Framing state for one peer.
///
/// Shared by reference between every builder writing to the peer. Sequence
/// numbers are handed out atomically and wrap at `u16::MAX`.
pub struct Connection {
    /// Unique connection ID, attached to every log line.
    pub id: String,

    config: SessionConfig,

    /// Sequence number of the next reliable packet.
    next_sequence: AtomicU16,

    /// Reliable packets sequenced so far.
    sequenced: AtomicU64,
}

impl Connection {
    /// Creates a new connection.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            next_sequence: AtomicU16::new(0),
            sequenced: AtomicU64::new(0),
        }
    }

    /// Returns the framing parameters.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sequence number the next reliable packet will receive.
    pub fn peek_sequence_number(&self) -> u16 {
        self.next_sequence.load(Ordering::Relaxed)
    }

    /// Number of sequence numbers handed out.
    pub fn sequenced_count(&self) -> u64 {
        self.sequenced.load(Ordering::Relaxed)
    }

    /// Checks the CRC trailer of a received packet.
    pub fn verify_crc(&self, packet: &[u8]) -> bool {
        checksum::verify(self.config.crc_seed, self.config.crc_length, packet)
    }
}

impl SessionContext for Connection {
    fn next_sequence_number(&self) -> u16 {
        self.sequenced.fetch_add(1, Ordering::Relaxed);
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn buffer_size(&self) -> u32 {
        self.config.buffer_size
    }

    fn is_compressable(&self) -> bool {
        self.config.compression
    }

    fn is_encrypted(&self) -> bool {
        self.config.encryption
    }

    fn compress(&self, data: &[u8]) -> Bytes {
        match compression::compress(data) {
            Ok(compressed) => compressed,
            Err(e) => {
                tracing::warn!(connection = %self.id, "compression failed, sending raw payload: {}", e);
                Bytes::copy_from_slice(data)
            }
        }
    }

    fn encrypt(&self, data: &[u8]) -> Bytes {
        cipher::encrypt(self.config.encryption_key, data)
    }

    fn crc32_trailer(&self, data: &[u8]) -> Bytes {
        checksum::trailer(self.config.crc_seed, self.config.crc_length, data)
    }

    fn log(&self, level: Level, message: &str) {
        let _span = tracing::error_span!("connection", id = %self.id).entered();
        soe_protocol::session::emit(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soe_protocol::{BuildMode, Builder, Message, SoeOpCode};
    use std::sync::Arc;

    fn config() -> SessionConfig {
        SessionConfig {
            crc_seed: 0x1234_5678,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_sequence_numbers_increment() {
        let conn = Connection::new(config());
        assert_eq!(conn.next_sequence_number(), 0);
        assert_eq!(conn.next_sequence_number(), 1);
        assert_eq!(conn.peek_sequence_number(), 2);
        assert_eq!(conn.sequenced_count(), 2);
    }

    #[test]
    fn test_sequence_numbers_wrap() {
        let conn = Connection::new(config());
        conn.next_sequence.store(u16::MAX, Ordering::Relaxed);
        assert_eq!(conn.next_sequence_number(), u16::MAX);
        assert_eq!(conn.next_sequence_number(), 0);
    }

    #[test]
    fn test_concurrent_sequence_numbers_are_unique() {
        let conn = Arc::new(Connection::new(config()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let conn = conn.clone();
                std::thread::spawn(move || {
                    (0..1000)
                        .map(|_| conn.next_sequence_number())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<u16> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 4000);
    }

    #[test]
    fn test_log_at_every_level() {
        let conn = Connection::new(config());
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            conn.log(level, "diagnostic");
        }
    }

    #[test]
    fn test_unique_ids() {
        let a = Connection::new(config());
        let b = Connection::new(config());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_reliable_packet_end_to_end() {
        let conn = Connection::new(config());
        let mut builder = Builder::with_opcode(0x0042u16, BuildMode::Message);
        builder.add_null_terminated_string("hello");

        let packet = builder.finalize_packet(&conn, false, false).unwrap();
        let raw = packet.raw();

        assert_eq!(packet.opcode(), SoeOpCode::ReliableData.value());
        assert_eq!(&raw[..2], &[0x00, 0x09]);
        // compression flag: payload is small
        assert_eq!(raw[2], 0x00);
        assert_eq!(&raw[3..5], &0u16.to_ne_bytes());
        assert_eq!(&raw[5..raw.len() - 2], builder.raw().as_ref());
        assert!(conn.verify_crc(raw));
    }

    #[test]
    fn test_large_reliable_packet_is_zlib_compressed() {
        let conn = Connection::new(config());
        let mut builder = Builder::with_opcode(0x0042u16, BuildMode::Message);
        builder.add_bytes(&[0x41; 300]);

        let packet = builder.finalize_packet(&conn, false, false).unwrap();
        let raw = packet.raw();
        assert_eq!(raw[2], 0x01);
        assert!(raw.len() < 300);

        let inflated = compression::decompress(&raw[3..raw.len() - 2]).unwrap();
        assert_eq!(&inflated[..2], &0u16.to_ne_bytes());
        assert_eq!(&inflated[2..], builder.raw().as_ref());
        assert!(conn.verify_crc(raw));
    }

    #[test]
    fn test_encrypted_packet_decrypts() {
        let conn = Connection::new(SessionConfig {
            compression: false,
            encryption: true,
            encryption_key: 0xA5A5_0F0F,
            ..config()
        });
        let mut builder = Builder::with_opcode(SoeOpCode::NetStatusRequest, BuildMode::Packet);
        builder.add_u32(1);
        builder.add_u32(2);
        builder.add_byte(3);

        let packet = builder.finalize_packet(&conn, true, true).unwrap();
        let raw = packet.raw();
        assert!(conn.verify_crc(raw));
        let plain = cipher::decrypt(0xA5A5_0F0F, &raw[2..raw.len() - 2]);
        assert_eq!(plain.as_ref(), &builder.raw()[2..]);
    }

    #[test]
    fn test_fragmented_message_with_default_buffer() {
        let conn = Connection::new(config());
        let mut builder = Builder::with_opcode(0x0042u16, BuildMode::Message);
        builder.add_bytes(&vec![7u8; 1200]);

        let message = builder.finalize_message(&conn).unwrap();
        assert!(message.is_fragmented());
        assert_eq!(message.fragment_count(), 3);
        assert!(builder.finalize_packet(&conn, true, true).is_err());
        assert_eq!(conn.peek_sequence_number(), 0);
    }

    #[test]
    fn test_multi_message_through_connection() {
        let conn = Connection::new(config());
        let mut multi = Builder::with_opcode(SoeOpCode::MultiMessage, BuildMode::Message);
        for opcode in [0x0010u16, 0x0011] {
            let mut sub = Builder::with_opcode(opcode, BuildMode::Message);
            sub.add_u16(opcode);
            multi.add_message(&Message::new(opcode, sub.raw()));
        }

        let packet = multi.finalize_packet(&conn, true, true).unwrap();
        assert!(conn.verify_crc(packet.raw()));
        assert_eq!(conn.sequenced_count(), 1);
    }
}
