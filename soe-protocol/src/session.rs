//! The connection-side collaborator consulted during finalization.

use bytes::Bytes;
use tracing::Level;

/// Per-connection services the builder needs to finalize frames.
///
/// Implementations are shared by reference between every builder that writes
/// to one connection. `next_sequence_number` must never hand out the same value
/// twice to concurrent callers; the transforms are treated as pure functions
/// of their input.
pub trait SessionContext {
    /// Allocates the sequence number for the next reliable packet.
    fn next_sequence_number(&self) -> u16;

    /// Transport buffer size in bytes.
    fn buffer_size(&self) -> u32;

    fn is_compressable(&self) -> bool;

    fn is_encrypted(&self) -> bool;

    fn compress(&self, data: &[u8]) -> Bytes;

    fn encrypt(&self, data: &[u8]) -> Bytes;

    /// Checksum bytes to append after `data`.
    fn crc32_trailer(&self, data: &[u8]) -> Bytes;

    /// Reports a builder diagnostic.
    fn log(&self, level: Level, message: &str) {
        emit(level, message);
    }
}

/// Emits `message` as a `tracing` event at `level`.
///
/// Events are recorded inside whatever span the caller has entered.
pub fn emit(level: Level, message: &str) {
    if level == Level::ERROR {
        tracing::error!("{}", message);
    } else if level == Level::WARN {
        tracing::warn!("{}", message);
    } else if level == Level::INFO {
        tracing::info!("{}", message);
    } else if level == Level::DEBUG {
        tracing::debug!("{}", message);
    } else {
        tracing::trace!("{}", message);
    }
}
