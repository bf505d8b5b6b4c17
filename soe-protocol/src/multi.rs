//! Embedding messages into other builders and multiplexed containers.
//!
//! A multi-message container body is a run of entries:
//!
//! ```text
//! +-------------+-------------+-------------+-------------+----
//! | size prefix | entry bytes | size prefix | entry bytes | ...
//! | 1..N bytes  | size bytes  |             |             |
//! +-------------+-------------+-------------+-------------+----
//! ```
//!
//! Sizes up to 255 take a single byte. Larger sizes start with `0xFF`, then a
//! byte derived from the remainder, then the remainder itself spelled out in
//! `0xFF` steps. Peers decode exactly this shape, so the encoding must not be
//! normalized into a conventional varint.

use crate::opcode::SoeOpCode;
use crate::packet::Message;
use crate::writer::{BuildMode, Builder};
use crate::OPCODE_LEN;
use bytes::BufMut;

const SIZE_STEP: usize = 0xFF;

/// Writes the multi-message size prefix for an entry of `size` bytes.
pub fn encode_size_prefix(size: usize, buf: &mut impl BufMut) {
    if size <= SIZE_STEP {
        buf.put_u8(size as u8);
        return;
    }

    buf.put_u8(0xFF);
    let mut size = size - SIZE_STEP;

    // Not a running total; kept as-is for peer compatibility.
    buf.put_u8((((size / SIZE_STEP) + (size % SIZE_STEP)) & 0xFF) as u8);

    while size > 0 {
        if size < SIZE_STEP {
            buf.put_u8(size as u8);
            size = 0;
        } else {
            buf.put_u8(0xFF);
            size -= SIZE_STEP;
        }
    }
}

/// Number of bytes [`encode_size_prefix`] emits for `size`.
pub fn size_prefix_len(size: usize) -> usize {
    if size <= SIZE_STEP {
        return 1;
    }
    let rest = size - SIZE_STEP;
    // marker + derived byte + one 0xFF per full step + the tail when non-zero
    2 + rest / SIZE_STEP + usize::from(rest % SIZE_STEP != 0)
}

impl Builder {
    /// Appends `message` to this builder.
    ///
    /// A packet builder takes the message bytes verbatim. A multi-message
    /// builder prefixes each entry with its size, and merges nested
    /// multi-message containers into itself. Any other message builder ignores
    /// the call.
    pub fn add_message(&mut self, message: &Message) {
        match self.mode {
            BuildMode::Packet => self.buffer.put_slice(message.raw()),
            BuildMode::Message if self.opcode != u16::from(SoeOpCode::MultiMessage) => {
                tracing::debug!(
                    opcode = self.opcode,
                    embedded = message.opcode(),
                    "ignoring message embedded into a non-multiplexed message builder"
                );
            }
            BuildMode::Message => {
                let raw = message.raw();
                if message.opcode() == u16::from(SoeOpCode::MultiMessage) {
                    let body = raw.get(OPCODE_LEN..).unwrap_or_default();
                    self.buffer.put_slice(body);
                } else {
                    self.buffer.reserve(size_prefix_len(raw.len()) + raw.len());
                    encode_size_prefix(raw.len(), &mut self.buffer);
                    self.buffer.put_slice(raw);
                }
            }
        }
    }

    /// Appends every message in `messages`, in order.
    pub fn add_messages<'a>(&mut self, messages: impl IntoIterator<Item = &'a Message>) {
        for message in messages {
            self.add_message(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use proptest::prelude::*;

    fn prefix(size: usize) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_size_prefix(size, &mut buf);
        buf.to_vec()
    }

    fn message_of_len(opcode: u16, len: usize) -> Message {
        let mut builder = Builder::with_opcode(opcode, BuildMode::Message);
        builder.add_bytes(&vec![0xAB; len - OPCODE_LEN]);
        Message::new(opcode, builder.raw())
    }

    fn multi_builder() -> Builder {
        Builder::with_opcode(SoeOpCode::MultiMessage, BuildMode::Message)
    }

    #[test]
    fn test_small_sizes_take_one_byte() {
        assert_eq!(prefix(0), vec![0x00]);
        assert_eq!(prefix(7), vec![0x07]);
        assert_eq!(prefix(255), vec![0xFF]);
    }

    #[test]
    fn test_large_size_shapes() {
        // 300 - 255 = 45; derived byte 0 + 45
        assert_eq!(prefix(300), vec![0xFF, 0x2D, 0x2D]);
        // 510 - 255 = 255; derived byte 1 + 0; one full step
        assert_eq!(prefix(510), vec![0xFF, 0x01, 0xFF]);
        // 600 - 255 = 345; derived byte 1 + 90; one full step then 90
        assert_eq!(prefix(600), vec![0xFF, 0x5B, 0xFF, 0x5A]);
        // 256 - 255 = 1
        assert_eq!(prefix(256), vec![0xFF, 0x01, 0x01]);
    }

    #[test]
    fn test_derived_byte_wraps() {
        // 255 + 254 + 255 * 2 = 1019 -> rest 764 = 2 * 255 + 254
        // derived byte (2 + 254) & 0xFF = 0
        assert_eq!(prefix(1019), vec![0xFF, 0x00, 0xFF, 0xFF, 0xFE]);
    }

    #[test]
    fn test_embed_small_message_into_multi() {
        let mut builder = multi_builder();
        let sub = message_of_len(0x0042, 10);
        builder.add_message(&sub);

        let raw = builder.raw();
        assert_eq!(&raw[..2], &u16::from(SoeOpCode::MultiMessage).to_ne_bytes());
        assert_eq!(raw[2], 10);
        assert_eq!(&raw[3..], sub.raw().as_ref());
    }

    #[test]
    fn test_embed_large_message_into_multi() {
        let mut builder = multi_builder();
        let sub = message_of_len(0x0042, 300);
        builder.add_message(&sub);

        let raw = builder.raw();
        assert_eq!(&raw[2..5], &[0xFF, 0x2D, 0x2D]);
        assert_eq!(&raw[5..], sub.raw().as_ref());
    }

    #[test]
    fn test_nested_multi_is_flattened() {
        let mut inner = multi_builder();
        inner.add_message(&message_of_len(0x0042, 4));
        inner.add_message(&message_of_len(0x0043, 5));
        let inner = Message::new(SoeOpCode::MultiMessage.value(), inner.raw());

        let mut outer = multi_builder();
        outer.add_message(&inner);

        let raw = outer.raw();
        // header + inner body, no extra prefix
        assert_eq!(raw.len(), 2 + inner.len() - 2);
        assert_eq!(&raw[2..], &inner.raw()[2..]);
        assert_eq!(raw[2], 4);
    }

    #[test]
    fn test_non_multi_message_builder_ignores_embed() {
        let mut builder = Builder::with_opcode(0x0042u16, BuildMode::Message);
        let before = builder.raw();
        builder.add_message(&message_of_len(0x0043, 8));
        assert_eq!(builder.raw(), before);
    }

    #[test]
    fn test_packet_builder_appends_verbatim() {
        let mut builder = Builder::with_opcode(SoeOpCode::MultiPacket, BuildMode::Packet);
        let sub = message_of_len(0x0042, 6);
        builder.add_message(&sub);
        assert_eq!(&builder.raw()[2..], sub.raw().as_ref());
    }

    #[test]
    fn test_packet_builder_does_not_flatten_multi() {
        let mut builder = Builder::new();
        let sub = message_of_len(SoeOpCode::MultiMessage.value(), 6);
        builder.add_message(&sub);
        assert_eq!(builder.raw(), *sub.raw());
    }

    #[test]
    fn test_add_messages_in_order() {
        let mut builder = multi_builder();
        let a = message_of_len(0x0001, 3);
        let b = message_of_len(0x0002, 4);
        builder.add_messages([&a, &b]);

        let raw = builder.raw();
        assert_eq!(raw[2], 3);
        assert_eq!(&raw[3..6], a.raw().as_ref());
        assert_eq!(raw[6], 4);
        assert_eq!(&raw[7..], b.raw().as_ref());
    }

    proptest! {
        #[test]
        fn prop_prefix_len_matches_encoding(size in 0usize..5000) {
            prop_assert_eq!(prefix(size).len(), size_prefix_len(size));
        }

        #[test]
        fn prop_small_entry_single_prefix_byte(len in 2usize..=255) {
            let mut builder = multi_builder();
            builder.add_message(&message_of_len(0x0042, len));
            let raw = builder.raw();
            prop_assert_eq!(raw.len(), 2 + 1 + len);
            prop_assert_eq!(raw[2] as usize, len);
        }
    }
}
