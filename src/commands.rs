//! Command execution.

use crate::Commands;
use colored::Colorize;
use serde::Serialize;
use soe_protocol::{BuildMode, Builder, Message, Packet, SoeOpCode};
use soe_session::{Connection, SessionError};

/// Wire bytes produced by a command.
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub kind: &'static str,
    pub opcode: u16,
    pub raw: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<String>,
}

impl FrameReport {
    fn from_packet(packet: &Packet) -> Self {
        Self {
            kind: "packet",
            opcode: packet.opcode(),
            raw: hex::encode(packet.raw()),
            fragments: Vec::new(),
        }
    }

    fn from_message(message: &Message) -> Self {
        Self {
            kind: "message",
            opcode: message.opcode(),
            raw: hex::encode(message.raw()),
            fragments: message.fragments().iter().map(hex::encode).collect(),
        }
    }

    /// Formats the report for the terminal, or as JSON.
    pub fn render(&self, json: bool) -> Result<String, serde_json::Error> {
        if json {
            return serde_json::to_string_pretty(self);
        }

        let opcode = match SoeOpCode::try_from(self.opcode) {
            Ok(op) => op.to_string(),
            Err(_) => format!("{:#06x}", self.opcode),
        };
        let mut out = format!("{} {}\n{}", self.kind.bold(), opcode.cyan(), self.raw);
        for (i, fragment) in self.fragments.iter().enumerate() {
            out.push_str(&format!("\n{} {}: {}", "fragment".dimmed(), i, fragment));
        }
        Ok(out)
    }
}

/// Executes a command and returns the frame it built.
pub fn execute(connection: &Connection, cmd: Commands) -> Result<FrameReport, SessionError> {
    match cmd {
        Commands::Config => Err(SessionError::InvalidInput(
            "config does not build a frame".to_string(),
        )),

        Commands::Packet {
            opcode,
            data,
            no_compress,
            crc,
        } => {
            let mut builder = Builder::with_opcode(opcode, BuildMode::Packet);
            builder.add_bytes(&decode_hex(&data)?);
            let packet = builder.finalize_packet(connection, !no_compress, crc)?;
            Ok(FrameReport::from_packet(&packet))
        }

        Commands::Message { opcode, data } => {
            let builder = message_builder(opcode, &data)?;
            let message = builder.finalize_message(connection)?;
            Ok(FrameReport::from_message(&message))
        }

        Commands::Reliable { opcode, data } => {
            let builder = message_builder(opcode, &data)?;
            let packet = builder.finalize_packet(connection, true, true)?;
            Ok(FrameReport::from_packet(&packet))
        }

        Commands::Multi { entries } => {
            let mut builder = Builder::with_opcode(SoeOpCode::MultiMessage, BuildMode::Message);
            for entry in &entries {
                builder.add_message(&parse_entry(entry)?);
            }
            let packet = builder.finalize_packet(connection, true, true)?;
            Ok(FrameReport::from_packet(&packet))
        }
    }
}

fn decode_hex(data: &str) -> Result<Vec<u8>, SessionError> {
    hex::decode(data.trim())
        .map_err(|e| SessionError::InvalidInput(format!("bad hex '{}': {}", data, e)))
}

fn message_builder(opcode: u16, data: &str) -> Result<Builder, SessionError> {
    let mut builder = Builder::with_opcode(opcode, BuildMode::Message);
    builder.add_bytes(&decode_hex(data)?);
    Ok(builder)
}

/// Parses an `OPCODE:HEX` multi-message entry into a message.
fn parse_entry(entry: &str) -> Result<Message, SessionError> {
    let (opcode, data) = entry
        .split_once(':')
        .ok_or_else(|| SessionError::InvalidInput(format!("entry '{}' is not OPCODE:HEX", entry)))?;
    let opcode = SoeOpCode::parse_value(opcode)?;
    let builder = message_builder(opcode, data)?;
    Ok(Message::new(opcode, builder.raw()))
}
