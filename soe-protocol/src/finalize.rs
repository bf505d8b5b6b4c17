//! Turning a builder into a wire packet.
//!
//! Packet layout:
//!
//! ```text
//! +----------+-------------------+-----------+-------------+
//! | opcode   | compressed flag   | payload   | CRC trailer |
//! | 2 bytes  | 1 byte, optional  | variable  | optional    |
//! +----------+-------------------+-----------+-------------+
//! ```
//!
//! The flag byte is present only when the session supports compression and
//! compression was requested; it records whether the payload passed the size
//! threshold. Encryption leaves no marker. The CRC covers every byte before it.
//!
//! A message builder is sent as reliable data. Its payload becomes:
//!
//! ```text
//! +-----------------+-------------------------+--------------+
//! | sequence number | message opcode          | message body |
//! | 2 bytes, host   | 2 bytes, host           |              |
//! +-----------------+-------------------------+--------------+
//! ```

use crate::error::{ProtocolError, UsageError};
use crate::fragment::fragment_limit;
use crate::opcode::SoeOpCode;
use crate::packet::Packet;
use crate::session::SessionContext;
use crate::writer::{BuildMode, Builder};
use crate::{COMPRESSION_THRESHOLD, OPCODE_LEN};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::Level;

impl Builder {
    /// Finalizes this builder into a single wire packet.
    ///
    /// Message builders are wrapped as reliable data: they consume one
    /// sequence number and are always compressed (when the session supports
    /// it) and checksummed, whatever `compressed` and `append_crc` say. A
    /// message too large for one packet is rejected; use
    /// [`Builder::finalize_message`] to fragment it.
    ///
    /// The builder itself is left untouched.
    pub fn finalize_packet<S>(
        &self,
        session: &S,
        compressed: bool,
        append_crc: bool,
    ) -> Result<Packet, ProtocolError>
    where
        S: SessionContext + ?Sized,
    {
        let (opcode, mut payload, compressed, append_crc) = match self.mode {
            BuildMode::Message => {
                let limit = fragment_limit(session.buffer_size());
                let size = self.buffer.len();
                if size > limit {
                    session.log(
                        Level::ERROR,
                        &format!(
                            "cannot send a {} byte message (opcode {:#06x}) as one packet; it needs fragmentation",
                            size, self.opcode
                        ),
                    );
                    session.log(
                        Level::INFO,
                        "use finalize_message for messages that may need fragmentation",
                    );
                    return Err(UsageError::RequiresFragmentation { size, limit }.into());
                }

                let mut reliable = BytesMut::with_capacity(2 + self.buffer.len());
                reliable.put_u16_ne(session.next_sequence_number());
                reliable.put_slice(&self.buffer);
                session.log(
                    Level::DEBUG,
                    &format!("wrapped message {:#06x} as reliable data", self.opcode),
                );

                (SoeOpCode::ReliableData.value(), reliable.freeze(), true, true)
            }
            BuildMode::Packet => {
                let body = self.buffer.get(OPCODE_LEN..).unwrap_or_default();
                (self.opcode, Bytes::copy_from_slice(body), compressed, append_crc)
            }
        };

        let mut frame = BytesMut::with_capacity(OPCODE_LEN + 1 + payload.len() + 4);
        frame.put_u16(opcode);

        if session.is_compressable() && compressed {
            let worth_compressing = payload.len() > COMPRESSION_THRESHOLD;
            frame.put_u8(u8::from(worth_compressing));
            if worth_compressing {
                payload = session.compress(&payload);
            }
        }

        if session.is_encrypted() {
            payload = session.encrypt(&payload);
        }

        frame.put_slice(&payload);

        if append_crc {
            let trailer = session.crc32_trailer(&frame);
            frame.put_slice(&trailer);
        }

        Ok(Packet::new(opcode, frame.freeze()))
    }
}
