//! Protocol error types.

use thiserror::Error;

/// Errors produced while finalizing a builder.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("session buffer size {buffer_size} leaves no room for a fragment")]
    BufferTooSmall { buffer_size: u32 },

    #[error("unknown opcode: {0:#06x}")]
    UnknownOpCode(u16),

    #[error("unknown opcode name: {0}")]
    UnknownOpCodeName(String),
}

impl ProtocolError {
    /// Returns whether the error was caused by calling a finalizer on the wrong
    /// kind of builder.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, ProtocolError::Usage(_))
    }
}

/// A finalizer was called on a builder it cannot handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("message finalization requested on a packet builder")]
    NotAMessage,

    #[error("message of {size} bytes exceeds the {limit} byte fragment limit and cannot be sent as one packet")]
    RequiresFragmentation { size: usize, limit: usize },
}
