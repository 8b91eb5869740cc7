use thiserror::Error;

/// Main error type for SML operations
#[derive(Error, Debug)]
pub enum SmlError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// CRC mismatch on an end-of-message escape sequence
    #[error("Framing error: CRC mismatch (received 0x{received:04X}, calculated 0x{calculated:04X})")]
    Framing { received: u16, calculated: u16 },

    /// Schema lookup or discriminant resolution failed for the current frame
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Buffer overflow: frame exceeds {0} bytes")]
    BufferOverflow(usize),
}

impl SmlError {
    /// Whether the error only affected a single frame
    ///
    /// Framing, protocol and overflow errors are contained at frame granularity:
    /// the parser has already discarded the broken frame and keeps scanning.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            SmlError::Framing { .. } | SmlError::Protocol(_) | SmlError::BufferOverflow(_)
        )
    }
}

/// Result type alias for SML operations
pub type SmlResult<T> = Result<T, SmlError>;
