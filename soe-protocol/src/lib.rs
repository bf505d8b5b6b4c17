//! # soe-protocol
//!
//! Outbound framing for the SOE UDP transport protocol.
//!
//! This crate provides:
//! - A stateful [`Builder`] with typed big-endian and host-order writes
//! - Multiplexed containers with the SOE variable-length size prefix
//! - Fragmentation of oversized messages into transport-bounded slices
//! - Finalization into wire packets (sequencing, compression, encryption, CRC)
//!
//! Compression, encryption and checksums are not implemented here. They are
//! supplied by the connection through [`SessionContext`].

pub mod error;
pub mod finalize;
pub mod fragment;
pub mod multi;
pub mod opcode;
pub mod packet;
pub mod session;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ProtocolError, UsageError};
pub use opcode::SoeOpCode;
pub use packet::{Message, Packet};
pub use session::SessionContext;
pub use writer::{BuildMode, Builder};

/// Bytes reserved below the session buffer size for packet envelope overhead.
pub const FRAGMENT_SAFETY_MARGIN: u32 = 10;

/// Payloads longer than this are compressed when compression is requested.
pub const COMPRESSION_THRESHOLD: usize = 100;

/// Size of the opcode header at the front of every packet and message.
pub const OPCODE_LEN: usize = 2;
