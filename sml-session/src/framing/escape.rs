//! SML escape sequences

/// Escape byte; four in a row introduce an escape code
pub const ESCAPE_BYTE: u8 = 0x1B;
/// Run length of escape bytes that starts an escape sequence
pub const ESCAPE_RUN: usize = 4;
/// Escape run followed by an escape code
pub const ESCAPE_SEQUENCE_LEN: usize = 8;
pub const ESCAPE_SEQUENCE: [u8; 4] = [ESCAPE_BYTE; 4];
/// Start of a version 1 message
pub const START_SEQUENCE: [u8; 8] = [0x1B, 0x1B, 0x1B, 0x1B, 0x01, 0x01, 0x01, 0x01];
/// First byte of an end-of-message escape code
pub const END_MARKER: u8 = 0x1A;

/// Escape code following four escape bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeCode {
    /// `1B 1B 1B 1B`: escape bytes inside the payload
    Escaped,
    /// `01 01 01 01`: start of message
    Start,
    /// `02 xx xx xx`: start of a version 2 block transfer
    BlockTransfer,
    /// `03 xx xx xx`: version 2 timeout
    Timeout,
    /// `04 xx xx xx`: version 2 block size
    BlockSize,
    /// `1A pp c1 c2`: end of message with padding count and checksum
    End { padding: u8, crc: u16 },
    Unknown([u8; 4]),
}

impl EscapeCode {
    /// Parse the 4 bytes following an escape run
    ///
    /// The end code transmits the checksum low byte first.
    pub fn parse(code: [u8; 4]) -> Self {
        match code {
            [ESCAPE_BYTE, ESCAPE_BYTE, ESCAPE_BYTE, ESCAPE_BYTE] => EscapeCode::Escaped,
            [0x01, 0x01, 0x01, 0x01] => EscapeCode::Start,
            [0x02, ..] => EscapeCode::BlockTransfer,
            [0x03, ..] => EscapeCode::Timeout,
            [0x04, ..] => EscapeCode::BlockSize,
            [END_MARKER, padding, c1, c2] => EscapeCode::End {
                padding,
                crc: u16::from_le_bytes([c1, c2]),
            },
            other => EscapeCode::Unknown(other),
        }
    }

    /// Build the end-of-message escape code
    pub fn end_code(padding: u8, crc: u16) -> [u8; 4] {
        let [low, high] = crc.to_le_bytes();
        [END_MARKER, padding, low, high]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_escape_codes() {
        assert_eq!(EscapeCode::parse([0x1B; 4]), EscapeCode::Escaped);
        assert_eq!(EscapeCode::parse([0x01; 4]), EscapeCode::Start);
        assert_eq!(EscapeCode::parse([0x02, 0x00, 0x00, 0x00]), EscapeCode::BlockTransfer);
        assert_eq!(EscapeCode::parse([0x03, 0x01, 0x02, 0x03]), EscapeCode::Timeout);
        assert_eq!(EscapeCode::parse([0x04, 0x00, 0x00, 0x40]), EscapeCode::BlockSize);
        assert_eq!(
            EscapeCode::parse([0x01, 0x01, 0x01, 0x02]),
            EscapeCode::Unknown([0x01, 0x01, 0x01, 0x02])
        );
    }

    #[test]
    fn test_end_code_byte_order() {
        assert_eq!(
            EscapeCode::parse([0x1A, 0x02, 0x6E, 0x90]),
            EscapeCode::End { padding: 2, crc: 0x906E }
        );
        assert_eq!(EscapeCode::end_code(2, 0x906E), [0x1A, 0x02, 0x6E, 0x90]);
    }
}
