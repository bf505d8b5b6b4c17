//! Stateful frame builder and its typed writes.
//!
//! Integers are written big-endian (network order) except for the `host_*`
//! writes, which use the platform's native order. Host order is only used for
//! message headers: a message-mode builder starts with its opcode in host order,
//! a packet-mode builder with its opcode big-endian.
//!
//! ```text
//! packet builder:  | opcode (BE, 2) | fields ...
//! message builder: | opcode (host, 2) | fields ...
//! ```

use crate::packet::{Message, Packet};
use bytes::{BufMut, Bytes, BytesMut};

/// What a builder produces when finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// A transport packet.
    #[default]
    Packet,
    /// An application message, fragmented on finalization if needed.
    Message,
}

/// Append-only byte accumulator for one packet or message.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) opcode: u16,
    pub(crate) mode: BuildMode,
    pub(crate) buffer: BytesMut,
}

impl Builder {
    /// Creates an empty packet builder with opcode 0 and no header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder and writes its opcode header.
    pub fn with_opcode(opcode: impl Into<u16>, mode: BuildMode) -> Self {
        let opcode = opcode.into();
        let mut builder = Self {
            opcode,
            mode,
            buffer: BytesMut::new(),
        };
        match mode {
            BuildMode::Packet => builder.add_u16(opcode),
            BuildMode::Message => builder.add_host_u16(opcode),
        }
        builder
    }

    /// Creates a packet builder holding a copy of `packet`'s bytes.
    pub fn from_packet(packet: &Packet) -> Self {
        Self {
            opcode: packet.opcode(),
            mode: BuildMode::Packet,
            buffer: BytesMut::from(packet.raw().as_ref()),
        }
    }

    /// Creates a message builder holding a copy of `message`'s bytes.
    pub fn from_message(message: &Message) -> Self {
        Self {
            opcode: message.opcode(),
            mode: BuildMode::Message,
            buffer: BytesMut::from(message.raw().as_ref()),
        }
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns a copy of everything written so far.
    pub fn raw(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buffer)
    }

    pub fn add_byte(&mut self, value: u8) {
        self.buffer.put_u8(value);
    }

    pub fn add_bytes(&mut self, value: &[u8]) {
        self.buffer.put_slice(value);
    }

    pub fn add_u16(&mut self, value: u16) {
        self.buffer.put_u16(value);
    }

    pub fn add_u32(&mut self, value: u32) {
        self.buffer.put_u32(value);
    }

    pub fn add_i16(&mut self, value: i16) {
        self.buffer.put_i16(value);
    }

    pub fn add_i32(&mut self, value: i32) {
        self.buffer.put_i32(value);
    }

    pub fn add_host_u16(&mut self, value: u16) {
        self.buffer.put_u16_ne(value);
    }

    pub fn add_host_u32(&mut self, value: u32) {
        self.buffer.put_u32_ne(value);
    }

    pub fn add_bool(&mut self, value: bool) {
        self.buffer.put_u8(u8::from(value));
    }

    /// Writes `value` as ASCII followed by a NUL terminator.
    ///
    /// Characters outside ASCII are written as `?`, one byte per character.
    pub fn add_null_terminated_string(&mut self, value: &str) {
        self.buffer.reserve(value.len() + 1);
        for c in value.chars() {
            self.buffer.put_u8(if c.is_ascii() { c as u8 } else { b'?' });
        }
        self.buffer.put_u8(0);
    }
}
