//! SOE transport opcodes.

use crate::error::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// Transport-level opcodes of the SOE protocol.
///
/// These values are part of the wire contract shared with existing peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SoeOpCode {
    SessionRequest = 0x0001,
    SessionResponse = 0x0002,
    MultiPacket = 0x0003,
    Disconnect = 0x0005,
    Ping = 0x0006,
    NetStatusRequest = 0x0007,
    NetStatusResponse = 0x0008,
    /// Sequenced packet carrying one (possibly multiplexed) message.
    ReliableData = 0x0009,
    FragmentedReliableData = 0x000D,
    OutOfOrderReliableData = 0x0011,
    AckReliableData = 0x0015,
    /// Container whose body is a run of size-prefixed sub-messages.
    MultiMessage = 0x0019,
    FatalError = 0x001D,
    FatalErrorResponse = 0x001E,
}

impl SoeOpCode {
    pub const ALL: [SoeOpCode; 14] = [
        SoeOpCode::SessionRequest,
        SoeOpCode::SessionResponse,
        SoeOpCode::MultiPacket,
        SoeOpCode::Disconnect,
        SoeOpCode::Ping,
        SoeOpCode::NetStatusRequest,
        SoeOpCode::NetStatusResponse,
        SoeOpCode::ReliableData,
        SoeOpCode::FragmentedReliableData,
        SoeOpCode::OutOfOrderReliableData,
        SoeOpCode::AckReliableData,
        SoeOpCode::MultiMessage,
        SoeOpCode::FatalError,
        SoeOpCode::FatalErrorResponse,
    ];

    pub fn value(self) -> u16 {
        self as u16
    }

    /// Kebab-case name used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            SoeOpCode::SessionRequest => "session-request",
            SoeOpCode::SessionResponse => "session-response",
            SoeOpCode::MultiPacket => "multi-packet",
            SoeOpCode::Disconnect => "disconnect",
            SoeOpCode::Ping => "ping",
            SoeOpCode::NetStatusRequest => "net-status-request",
            SoeOpCode::NetStatusResponse => "net-status-response",
            SoeOpCode::ReliableData => "reliable-data",
            SoeOpCode::FragmentedReliableData => "fragmented-reliable-data",
            SoeOpCode::OutOfOrderReliableData => "out-of-order-reliable-data",
            SoeOpCode::AckReliableData => "ack-reliable-data",
            SoeOpCode::MultiMessage => "multi-message",
            SoeOpCode::FatalError => "fatal-error",
            SoeOpCode::FatalErrorResponse => "fatal-error-response",
        }
    }

    /// Parses an opcode given as a name, a decimal number or a `0x` hex number.
    ///
    /// Numeric values outside the known table are accepted, since application
    /// messages carry their own opcode space.
    pub fn parse_value(s: &str) -> Result<u16, ProtocolError> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u16::from_str_radix(hex, 16)
                .map_err(|_| ProtocolError::UnknownOpCodeName(s.to_string()));
        }
        if let Ok(value) = s.parse::<u16>() {
            return Ok(value);
        }
        s.parse::<SoeOpCode>().map(SoeOpCode::value)
    }
}

impl From<SoeOpCode> for u16 {
    fn from(opcode: SoeOpCode) -> Self {
        opcode as u16
    }
}

impl TryFrom<u16> for SoeOpCode {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        SoeOpCode::ALL
            .into_iter()
            .find(|op| op.value() == value)
            .ok_or(ProtocolError::UnknownOpCode(value))
    }
}

impl FromStr for SoeOpCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        SoeOpCode::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| ProtocolError::UnknownOpCodeName(s.to_string()))
    }
}

impl fmt::Display for SoeOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06x})", self.name(), self.value())
    }
}
