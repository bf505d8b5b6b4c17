//! Splitting messages that do not fit into one transport packet.

use crate::error::{ProtocolError, UsageError};
use crate::packet::Message;
use crate::session::SessionContext;
use crate::writer::{BuildMode, Builder};
use crate::FRAGMENT_SAFETY_MARGIN;
use bytes::Bytes;
use tracing::Level;

/// Largest message, in bytes, that still travels in a single packet for a
/// session with the given buffer size.
pub fn fragment_limit(buffer_size: u32) -> usize {
    buffer_size.saturating_sub(FRAGMENT_SAFETY_MARGIN) as usize
}

/// Splits `raw` into consecutive slices of `limit` bytes; the last may be shorter.
///
/// The slices share `raw`'s storage. A zero `limit` yields no fragments.
pub fn split(raw: &Bytes, limit: usize) -> Vec<Bytes> {
    if limit == 0 {
        return Vec::new();
    }
    let mut fragments = Vec::with_capacity(raw.len().div_ceil(limit));
    let mut offset = 0;
    while offset < raw.len() {
        let end = (offset + limit).min(raw.len());
        fragments.push(raw.slice(offset..end));
        offset = end;
    }
    fragments
}

impl Builder {
    /// Finalizes a message builder, fragmenting the content when it exceeds
    /// the session's single-packet limit.
    pub fn finalize_message<S>(&self, session: &S) -> Result<Message, ProtocolError>
    where
        S: SessionContext + ?Sized,
    {
        if self.mode != BuildMode::Message {
            session.log(
                Level::ERROR,
                "finalize_message called on a packet builder; no message produced",
            );
            return Err(UsageError::NotAMessage.into());
        }

        let raw = self.raw();
        let buffer_size = session.buffer_size();
        let limit = fragment_limit(buffer_size);
        if raw.len() <= limit {
            return Ok(Message::new(self.opcode, raw));
        }
        if limit == 0 {
            session.log(
                Level::ERROR,
                &format!(
                    "session buffer size {} leaves no room to fragment a {} byte message",
                    buffer_size,
                    raw.len()
                ),
            );
            return Err(ProtocolError::BufferTooSmall { buffer_size });
        }

        let fragments = split(&raw, limit);
        tracing::trace!(
            opcode = self.opcode,
            size = raw.len(),
            limit,
            fragments = fragments.len(),
            "fragmented message"
        );
        Ok(Message::fragmented(self.opcode, raw, fragments))
    }
}
