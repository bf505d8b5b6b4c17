//! Immutable frame values produced by the builder.

use bytes::Bytes;

/// A complete transport unit, ready to hand to the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    opcode: u16,
    raw: Bytes,
}

impl Packet {
    /// Wraps bytes that already form a full packet, opcode header included.
    pub fn new(opcode: u16, raw: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            raw: raw.into(),
        }
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// Wire bytes of the packet.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn into_raw(self) -> Bytes {
        self.raw
    }
}

/// An application-level message, possibly too large for a single packet.
///
/// When `is_fragmented()` is true, `fragments()` holds consecutive slices of
/// `raw()` which concatenate back to it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    opcode: u16,
    raw: Bytes,
    is_fragmented: bool,
    fragments: Vec<Bytes>,
}

impl Message {
    /// Creates an unfragmented message from its raw bytes (opcode header included).
    pub fn new(opcode: u16, raw: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            raw: raw.into(),
            is_fragmented: false,
            fragments: Vec::new(),
        }
    }

    pub(crate) fn fragmented(opcode: u16, raw: Bytes, fragments: Vec<Bytes>) -> Self {
        Self {
            opcode,
            raw,
            is_fragmented: true,
            fragments,
        }
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn is_fragmented(&self) -> bool {
        self.is_fragmented
    }

    pub fn fragments(&self) -> &[Bytes] {
        &self.fragments
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}
