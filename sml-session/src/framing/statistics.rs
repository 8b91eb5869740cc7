//! SML parser statistics collection

/// SML parser statistics
///
/// Tracks counters for stream monitoring and debugging.
///
/// # Usage
/// Statistics are updated by the parser on every fed byte and frame outcome.
/// Users can query them at any time through `SmlParser::statistics`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmlStatistics {
    /// Total number of bytes fed
    pub bytes_received: u64,
    /// Number of frames decoded successfully
    pub frames_received: u64,
    /// Number of frames rejected due to a CRC mismatch
    pub crc_errors: u64,
    /// Number of CRC-valid frames that failed to decode
    pub protocol_errors: u64,
    /// Number of start sequences inside a started message
    pub nested_starts: u64,
    /// Number of skipped TLV elements with reserved type bits
    pub unknown_tags: u64,
    /// Number of frames discarded for exceeding the buffer limit
    pub overflows: u64,
}

impl SmlStatistics {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all statistics counters
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn increment_bytes_received(&mut self) {
        self.bytes_received += 1;
    }

    pub fn increment_frames_received(&mut self) {
        self.frames_received += 1;
    }

    pub fn increment_crc_errors(&mut self) {
        self.crc_errors += 1;
    }

    pub fn increment_protocol_errors(&mut self) {
        self.protocol_errors += 1;
    }

    pub fn increment_nested_starts(&mut self) {
        self.nested_starts += 1;
    }

    pub fn increment_unknown_tags(&mut self) {
        self.unknown_tags += 1;
    }

    pub fn increment_overflows(&mut self) {
        self.overflows += 1;
    }

    /// Get the number of end sequences that reached a verdict
    pub fn frames_completed(&self) -> u64 {
        self.frames_received + self.crc_errors + self.protocol_errors
    }

    /// Calculate the frame error rate
    ///
    /// # Returns
    /// Percentage of completed frames that were rejected (0.0 to 100.0)
    pub fn error_rate(&self) -> f64 {
        let total = self.frames_completed();
        if total == 0 {
            return 0.0;
        }
        (self.crc_errors + self.protocol_errors) as f64 / total as f64 * 100.0
    }
}
