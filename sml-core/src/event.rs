//! Events reported while scanning and decoding an SML stream

use std::fmt;

/// Event emitted by the SML parser
///
/// Informational events (`NestedStart`, `BlockTransferStart`, `UnknownTlvTag`)
/// never change how the following bytes are parsed. The remaining variants
/// mirror the frame-local errors returned from `SmlParser::feed` and are
/// reported through the same hook so that a single sink sees everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmlEvent {
    /// A start sequence arrived while a message was already started
    NestedStart,
    /// A version 2 block transfer escape code was seen
    BlockTransferStart,
    /// A TLV element with reserved type bits was skipped
    UnknownTlvTag(u8),
    /// An end sequence carried a checksum that does not match the frame
    FramingError { received: u16, calculated: u16 },
    /// A CRC-valid frame could not be decoded against the schema
    ProtocolError(String),
    /// A started frame grew beyond the configured buffer limit
    BufferOverflow(usize),
}

impl SmlEvent {
    /// Whether this event reports a discarded frame
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SmlEvent::FramingError { .. } | SmlEvent::ProtocolError(_) | SmlEvent::BufferOverflow(_)
        )
    }
}

impl fmt::Display for SmlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmlEvent::NestedStart => write!(f, "nested start sequence detected"),
            SmlEvent::BlockTransferStart => write!(f, "start of block transfer"),
            SmlEvent::UnknownTlvTag(tl) => {
                write!(f, "unknown or reserved type-length field: 0x{:02X}", tl)
            }
            SmlEvent::FramingError { received, calculated } => write!(
                f,
                "bad CRC: received 0x{:04X}, calculated 0x{:04X}",
                received, calculated
            ),
            SmlEvent::ProtocolError(msg) => write!(f, "protocol error: {}", msg),
            SmlEvent::BufferOverflow(limit) => {
                write!(f, "frame exceeds buffer limit of {} bytes", limit)
            }
        }
    }
}
