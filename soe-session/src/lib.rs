//! # soe-session
//!
//! The connection side of SOE framing.
//!
//! This crate provides:
//! - [`Connection`], a [`soe_protocol::SessionContext`] with an atomic
//!   sequence counter
//! - Seeded CRC-32 trailers
//! - zlib payload compression
//! - The SOE XOR chain cipher
//! - YAML and environment based configuration

pub mod checksum;
pub mod cipher;
pub mod compression;
pub mod config;
pub mod connection;
pub mod error;

pub use config::{Config, ConfigError, SessionConfig};
pub use connection::Connection;
pub use error::SessionError;

/// Default transport buffer size in bytes.
pub const DEFAULT_BUFFER_SIZE: u32 = 512;

/// Default number of CRC bytes appended to a packet.
pub const DEFAULT_CRC_LENGTH: u8 = 2;
