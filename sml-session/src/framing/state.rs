//! Escape scanning state machine

use crate::framing::escape::{ESCAPE_BYTE, ESCAPE_RUN};

/// Scanner state of the SML frame assembler
///
/// # State Transitions
/// ```text
/// Normal -> CountingEscape(1)           (on 0x1B)
/// CountingEscape(n) -> CountingEscape(n + 1)  (on 0x1B, n < 3)
/// CountingEscape(3) -> EscapeCode { remaining: 4 }  (on 0x1B)
/// CountingEscape(n) -> Normal           (on any other byte)
/// EscapeCode { remaining } -> Normal    (after the 4th code byte)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Scanning payload bytes
    #[default]
    Normal,
    /// Inside a run of escape bytes of the given length
    CountingEscape(u8),
    /// Collecting the escape code after a full escape run
    EscapeCode { remaining: u8 },
}

impl ScanState {
    /// Advance by one byte
    ///
    /// # Returns
    /// The next state and whether `byte` completed an escape code
    pub fn advance(self, byte: u8) -> (ScanState, bool) {
        match self {
            ScanState::Normal | ScanState::CountingEscape(_) if byte != ESCAPE_BYTE => {
                (ScanState::Normal, false)
            }
            ScanState::Normal => (ScanState::CountingEscape(1), false),
            ScanState::CountingEscape(n) if usize::from(n) + 1 == ESCAPE_RUN => {
                (ScanState::EscapeCode { remaining: 4 }, false)
            }
            ScanState::CountingEscape(n) => (ScanState::CountingEscape(n + 1), false),
            ScanState::EscapeCode { remaining: 1 } => (ScanState::Normal, true),
            ScanState::EscapeCode { remaining } => (
                ScanState::EscapeCode {
                    remaining: remaining - 1,
                },
                false,
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Normal => "Normal",
            ScanState::CountingEscape(_) => "CountingEscape",
            ScanState::EscapeCode { .. } => "EscapeCode",
        }
    }
}
