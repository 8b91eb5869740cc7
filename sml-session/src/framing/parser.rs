//! SML frame assembler
//!
//! Bytes are fed one at a time. The parser keeps the raw bytes of the frame in
//! progress, recognises escape sequences, checks the CRC on the end sequence
//! and decodes the payload into an [`SmlFile`].

use crate::error::{SmlError, SmlResult};
use crate::framing::crc::crc16;
use crate::framing::escape::{EscapeCode, ESCAPE_SEQUENCE_LEN};
use crate::framing::settings::ParserSettings;
use crate::framing::sink::EventSink;
use crate::framing::state::ScanState;
use crate::framing::statistics::SmlStatistics;
use bytes::{Buf, BufMut, BytesMut};
use sml_codec::{Schema, SmlFile, TlvDecoder};
use sml_core::SmlEvent;

/// Byte-fed SML frame assembler
///
/// One parser per byte stream. After an error from [`feed`](Self::feed) the
/// parser has already dropped the broken frame and the next byte may be fed.
///
/// # Usage
/// ```
/// use sml_session::{SmlFrame, SmlParser};
///
/// let mut parser = SmlParser::new();
/// for byte in SmlFrame::encode(&[0x00]) {
///     if parser.feed(byte).unwrap() {
///         assert!(parser.take_sml_file().unwrap().is_empty());
///     }
/// }
/// ```
pub struct SmlParser {
    buffer: BytesMut,
    state: ScanState,
    message_started: bool,
    /// Buffer offsets of escape codes that stand for literal escape bytes
    escaped_at: Vec<usize>,
    settings: ParserSettings,
    sml_file: Option<SmlFile>,
    statistics: SmlStatistics,
    sink: Option<Box<dyn EventSink>>,
}

impl SmlParser {
    /// Create a parser with default settings
    pub fn new() -> Self {
        Self::build(ParserSettings::default())
    }

    /// Create a parser with custom settings
    pub fn with_settings(settings: ParserSettings) -> SmlResult<Self> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: ParserSettings) -> Self {
        Self {
            buffer: BytesMut::new(),
            state: ScanState::Normal,
            message_started: false,
            escaped_at: Vec::new(),
            settings,
            sml_file: None,
            statistics: SmlStatistics::new(),
            sink: None,
        }
    }

    /// Register a receiver for parser events
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Feed one byte
    ///
    /// # Returns
    /// * `Ok(true)` - a frame completed on this byte; see [`sml_file`](Self::sml_file)
    /// * `Ok(false)` - nothing completed
    /// * `Err(_)` - the frame in progress was discarded (CRC mismatch, decode
    ///   failure or buffer overflow)
    pub fn feed(&mut self, byte: u8) -> SmlResult<bool> {
        self.statistics.increment_bytes_received();
        self.buffer.put_u8(byte);

        let (next, code_complete) = self.state.advance(byte);
        self.state = next;
        if code_complete {
            let len = self.buffer.len();
            let code = [
                self.buffer[len - 4],
                self.buffer[len - 3],
                self.buffer[len - 2],
                self.buffer[len - 1],
            ];
            if let Some(result) = self.handle_escape(EscapeCode::parse(code)) {
                return result;
            }
        }

        self.enforce_buffer_limit()?;
        Ok(false)
    }

    /// Handle a complete escape code; `Some` when the frame ended
    fn handle_escape(&mut self, code: EscapeCode) -> Option<SmlResult<bool>> {
        match code {
            EscapeCode::Escaped => {
                self.escaped_at.push(self.buffer.len() - 4);
            }
            EscapeCode::Start => {
                if self.message_started {
                    self.statistics.increment_nested_starts();
                    self.emit(SmlEvent::NestedStart);
                }
                self.message_started = true;
                self.keep_escape_sequence();
            }
            EscapeCode::BlockTransfer => self.emit(SmlEvent::BlockTransferStart),
            EscapeCode::Timeout | EscapeCode::BlockSize | EscapeCode::Unknown(_) => {
                log::debug!("Ignoring escape code {:?}", code);
            }
            EscapeCode::End { padding, crc } => {
                if !self.message_started {
                    log::debug!("End sequence without start, dropping {} bytes", self.buffer.len());
                    self.discard();
                    return Some(Ok(false));
                }
                return Some(self.finish_frame(padding, crc));
            }
        }
        None
    }

    fn finish_frame(&mut self, padding: u8, received: u16) -> SmlResult<bool> {
        self.message_started = false;
        self.sml_file = None;

        let len = self.buffer.len();
        let calculated = crc16(&self.buffer[..len - 2]);
        if calculated != received {
            self.discard();
            self.statistics.increment_crc_errors();
            self.emit(SmlEvent::FramingError { received, calculated });
            return Err(SmlError::Framing { received, calculated });
        }

        let payload = self.take_payload(usize::from(padding));
        self.discard();
        match payload.and_then(|payload| self.decode(payload)) {
            Ok(file) => {
                log::debug!("Decoded SML file with {} messages", file.len());
                self.statistics.increment_frames_received();
                self.sml_file = Some(file);
                Ok(true)
            }
            Err(e) => {
                self.statistics.increment_protocol_errors();
                self.emit(SmlEvent::ProtocolError(e.to_string()));
                Err(e)
            }
        }
    }

    /// Copy the payload between start sequence and padding
    ///
    /// Escape codes standing for literal escape bytes are dropped; the raw
    /// buffer keeps them because the CRC covers them. The payload is therefore
    /// not a verbatim copy of the wire bytes between start and padding.
    fn take_payload(&self, padding: usize) -> SmlResult<Vec<u8>> {
        let start = ESCAPE_SEQUENCE_LEN;
        let end = self
            .buffer
            .len()
            .checked_sub(ESCAPE_SEQUENCE_LEN + padding)
            .filter(|&end| end >= start)
            .ok_or_else(|| {
                SmlError::Protocol(format!(
                    "Padding of {} bytes exceeds frame of {} bytes",
                    padding,
                    self.buffer.len()
                ))
            })?;

        let mut payload = Vec::with_capacity(end - start);
        let mut position = start;
        for &offset in self.escaped_at.iter().filter(|&&o| o >= start && o < end) {
            payload.extend_from_slice(&self.buffer[position..offset]);
            position = offset + 4;
        }
        if position < end {
            payload.extend_from_slice(&self.buffer[position..end]);
        }
        Ok(payload)
    }

    fn decode(&mut self, payload: Vec<u8>) -> SmlResult<SmlFile> {
        let mut decoder = TlvDecoder::new(payload, Schema::standard())
            .with_max_depth(self.settings.max_nesting_depth);
        let result = decoder.decode_file();
        for event in decoder.take_events() {
            if matches!(event, SmlEvent::UnknownTlvTag(_)) {
                self.statistics.increment_unknown_tags();
            }
            self.emit(event);
        }
        SmlFile::from_value(result?)
    }

    fn enforce_buffer_limit(&mut self) -> SmlResult<()> {
        let limit = self.settings.max_buffer_len;
        if self.buffer.len() <= limit {
            return Ok(());
        }

        if !self.message_started {
            // Nothing started yet: only a partial escape sequence can matter
            self.keep_escape_sequence();
            return Ok(());
        }

        self.message_started = false;
        self.state = ScanState::Normal;
        self.discard();
        self.statistics.increment_overflows();
        self.emit(SmlEvent::BufferOverflow(limit));
        Err(SmlError::BufferOverflow(limit))
    }

    /// Keep only the last escape sequence worth of bytes
    fn keep_escape_sequence(&mut self) {
        let excess = self.buffer.len().saturating_sub(ESCAPE_SEQUENCE_LEN);
        self.buffer.advance(excess);
        self.escaped_at.clear();
    }

    fn discard(&mut self) {
        self.buffer.clear();
        self.escaped_at.clear();
    }

    fn emit(&mut self, event: SmlEvent) {
        match &event {
            SmlEvent::BlockTransferStart => log::info!("{}", event),
            SmlEvent::UnknownTlvTag(_) => log::debug!("{}", event),
            _ => log::warn!("{}", event),
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.on_event(&event);
        }
    }

    /// Get the file decoded by the last completed frame
    pub fn sml_file(&self) -> Option<&SmlFile> {
        self.sml_file.as_ref()
    }

    /// Take the file decoded by the last completed frame
    pub fn take_sml_file(&mut self) -> Option<SmlFile> {
        self.sml_file.take()
    }

    pub fn statistics(&self) -> &SmlStatistics {
        &self.statistics
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub fn is_message_started(&self) -> bool {
        self.message_started
    }

    /// Number of raw bytes currently buffered
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all buffered state; statistics are kept
    pub fn reset(&mut self) {
        self.discard();
        self.state = ScanState::Normal;
        self.message_started = false;
        self.sml_file = None;
    }
}

impl Default for SmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::escape::{ESCAPE_SEQUENCE, START_SEQUENCE};
    use crate::framing::frame::SmlFrame;
    use crate::framing::sink::MockEventSink;
    use sml_codec::{MessageKind, TlvEncoder};
    use std::sync::{Arc, Mutex};

    fn close_response_payload(transaction_id: &[u8]) -> Vec<u8> {
        let mut encoder = TlvEncoder::new();
        encoder.encode_list(6).encode_octet_string(transaction_id);
        encoder.encode_unsigned(0, 1).unwrap();
        encoder.encode_unsigned(0, 1).unwrap();
        encoder.encode_list(2);
        encoder.encode_unsigned(0x0201, 2).unwrap();
        encoder.encode_list(1).encode_absent();
        encoder.encode_unsigned(0x1234, 2).unwrap();
        encoder.encode_end_of_message();
        encoder.into_bytes()
    }

    fn feed_all(parser: &mut SmlParser, bytes: &[u8]) -> Vec<SmlResult<bool>> {
        bytes.iter().map(|&byte| parser.feed(byte)).collect()
    }

    fn recorded_events(parser: SmlParser) -> (SmlParser, Arc<Mutex<Vec<SmlEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = Arc::clone(&events);
        let parser = parser.with_event_sink(move |event: &SmlEvent| {
            sink_events.lock().unwrap().push(event.clone());
        });
        (parser, events)
    }

    #[test]
    fn test_frame_completes_on_last_byte() {
        let frame = SmlFrame::encode(&close_response_payload(&[0x01]));
        let mut parser = SmlParser::new();

        let results = feed_all(&mut parser, &frame);
        let last = results.len() - 1;
        for (i, result) in results.iter().enumerate() {
            assert_eq!(*result.as_ref().unwrap(), i == last, "byte {}", i);
        }

        let file = parser.take_sml_file().unwrap();
        assert_eq!(file.len(), 1);
        let message = &file.messages()[0];
        assert_eq!(message.transaction_id(), Some(&[0x01][..]));
        assert_eq!(message.kind(), Some(MessageKind::CloseResponse));
        assert_eq!(parser.buffered_len(), 0);
        assert_eq!(parser.statistics().frames_received, 1);
    }

    #[test]
    fn test_crc_bit_flip_rejected_then_resync() {
        let frame = SmlFrame::encode(&close_response_payload(&[0x01]));
        let mut parser = SmlParser::new();

        for bit in 0..16 {
            let mut broken = frame.clone();
            let index = frame.len() - 2 + bit / 8;
            broken[index] ^= 1 << (bit % 8);

            let results = feed_all(&mut parser, &broken);
            let (last, rest) = results.split_last().unwrap();
            assert!(rest.iter().all(|r| matches!(r, Ok(false))));
            assert!(matches!(last, Err(SmlError::Framing { .. })), "bit {}", bit);
            assert!(parser.sml_file().is_none());

            let results = feed_all(&mut parser, &frame);
            assert!(matches!(results.last(), Some(Ok(true))));
        }
        assert_eq!(parser.statistics().crc_errors, 16);
        assert_eq!(parser.statistics().frames_received, 16);
        assert_eq!(parser.statistics().error_rate(), 50.0);
    }

    #[test]
    fn test_nested_start() {
        let (mut parser, events) = recorded_events(SmlParser::new());
        feed_all(&mut parser, &START_SEQUENCE);
        assert!(parser.is_message_started());

        let results = feed_all(&mut parser, &SmlFrame::encode(&close_response_payload(&[0x02])));
        assert!(matches!(results.last(), Some(Ok(true))));
        assert_eq!(*events.lock().unwrap(), vec![SmlEvent::NestedStart]);
        assert_eq!(parser.statistics().nested_starts, 1);
    }

    #[test]
    fn test_garbage_before_start() {
        let mut parser = SmlParser::new();
        let mut bytes = vec![0x42, 0x1B, 0x1B, 0x00, 0xFF, 0x1B, 0x1B, 0x1B, 0x00];
        bytes.extend(SmlFrame::encode(&close_response_payload(&[0x03])));

        let results = feed_all(&mut parser, &bytes);
        assert!(matches!(results.last(), Some(Ok(true))));
        assert_eq!(results.iter().filter(|r| matches!(r, Ok(true))).count(), 1);
    }

    #[test]
    fn test_end_without_start() {
        let mut parser = SmlParser::new();
        let results = feed_all(&mut parser, &[0x00, 0x1B, 0x1B, 0x1B, 0x1B, 0x1A, 0x00, 0x12, 0x34]);
        assert!(results.iter().all(|r| matches!(r, Ok(false))));
        assert_eq!(parser.buffered_len(), 0);
        assert!(parser.sml_file().is_none());
    }

    #[test]
    fn test_escaped_escape_in_payload() {
        let transaction_id = [0x1B, 0x1B, 0x1B, 0x1B, 0x1B];
        let frame = SmlFrame::encode(&close_response_payload(&transaction_id));
        let mut parser = SmlParser::new();

        let results = feed_all(&mut parser, &frame);
        assert!(matches!(results.last(), Some(Ok(true))));
        let file = parser.sml_file().unwrap();
        assert_eq!(file.messages()[0].transaction_id(), Some(&transaction_id[..]));
    }

    #[test]
    fn test_block_transfer_event() {
        let (mut parser, events) = recorded_events(SmlParser::new());
        feed_all(&mut parser, &[0x1B, 0x1B, 0x1B, 0x1B, 0x02, 0x00, 0x00, 0x00]);
        feed_all(&mut parser, &[0x1B, 0x1B, 0x1B, 0x1B, 0x03, 0x00, 0x00, 0x00]);
        assert_eq!(*events.lock().unwrap(), vec![SmlEvent::BlockTransferStart]);
    }

    #[test]
    fn test_protocol_error_discards_frame() {
        let (mut parser, events) = recorded_events(SmlParser::new());
        // A message with seven elements overflows the smlMessage struct
        let mut payload = vec![0x77];
        payload.extend([0x01; 7]);
        payload.push(0x00);

        let results = feed_all(&mut parser, &SmlFrame::encode(&payload));
        assert!(matches!(results.last(), Some(Err(SmlError::Protocol(_)))));
        assert!(parser.sml_file().is_none());
        assert_eq!(parser.statistics().protocol_errors, 1);
        assert!(matches!(events.lock().unwrap().as_slice(), [SmlEvent::ProtocolError(_)]));

        let results = feed_all(&mut parser, &SmlFrame::encode(&close_response_payload(&[0x04])));
        assert!(matches!(results.last(), Some(Ok(true))));
    }

    #[test]
    fn test_padding_beyond_frame() {
        let mut frame = START_SEQUENCE.to_vec();
        frame.extend([0x00; 4]);
        frame.extend(ESCAPE_SEQUENCE);
        let mut covered = frame.clone();
        covered.extend([0x1A, 0xFF]);
        let crc = crc16(&covered);
        frame.extend(EscapeCode::end_code(0xFF, crc));

        let mut parser = SmlParser::new();
        let results = feed_all(&mut parser, &frame);
        assert!(matches!(results.last(), Some(Err(SmlError::Protocol(_)))));
        assert!(parser.sml_file().is_none());
        assert_eq!(parser.statistics().protocol_errors, 1);

        let results = feed_all(&mut parser, &SmlFrame::encode(&close_response_payload(&[0x06])));
        assert!(matches!(results.last(), Some(Ok(true))));
    }

    #[test]
    fn test_short_tl_in_frame() {
        let mut parser = SmlParser::new();
        let results = feed_all(&mut parser, &SmlFrame::encode(&[0x76, 0x50, 0x00]));
        assert!(matches!(results.last(), Some(Err(SmlError::Protocol(_)))));
    }

    #[test]
    fn test_unknown_tag_is_reported() {
        let (mut parser, events) = recorded_events(SmlParser::new());
        let results = feed_all(&mut parser, &SmlFrame::encode(&[0x23, 0xAA, 0xBB, 0x00]));

        assert!(matches!(results.last(), Some(Ok(true))));
        assert!(parser.sml_file().unwrap().is_empty());
        assert_eq!(*events.lock().unwrap(), vec![SmlEvent::UnknownTlvTag(0x23)]);
        assert_eq!(parser.statistics().unknown_tags, 1);
    }

    #[test]
    fn test_buffer_overflow() {
        let settings = ParserSettings {
            max_buffer_len: 64,
            ..Default::default()
        };
        let mut parser = SmlParser::with_settings(settings).unwrap();

        let mut bytes = START_SEQUENCE.to_vec();
        bytes.extend([0x00; 100]);
        let results = feed_all(&mut parser, &bytes);
        let errors: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Err(SmlError::BufferOverflow(64))));
        assert!(parser.buffered_len() <= 64);
        assert_eq!(parser.statistics().overflows, 1);

        let results = feed_all(&mut parser, &SmlFrame::encode(&close_response_payload(&[0x05])));
        assert!(matches!(results.last(), Some(Ok(true))));
    }

    #[test]
    fn test_garbage_is_trimmed() {
        let settings = ParserSettings {
            max_buffer_len: 32,
            ..Default::default()
        };
        let mut parser = SmlParser::with_settings(settings).unwrap();
        let results = feed_all(&mut parser, &[0x55; 1000]);
        assert!(results.iter().all(|r| matches!(r, Ok(false))));
        assert!(parser.buffered_len() <= 32);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = ParserSettings {
            max_buffer_len: 8,
            ..Default::default()
        };
        assert!(SmlParser::with_settings(settings).is_err());
    }

    #[test]
    fn test_mock_sink() {
        let mut sink = MockEventSink::new();
        sink.expect_on_event()
            .withf(|event| *event == SmlEvent::NestedStart)
            .times(1)
            .return_const(());

        let mut parser = SmlParser::new().with_event_sink(sink);
        feed_all(&mut parser, &START_SEQUENCE);
        feed_all(&mut parser, &START_SEQUENCE);
        assert_eq!(parser.buffered_len(), 8);
    }

    #[test]
    fn test_reset() {
        let mut parser = SmlParser::new();
        feed_all(&mut parser, &START_SEQUENCE);
        parser.reset();
        assert!(!parser.is_message_started());
        assert_eq!(parser.buffered_len(), 0);
        assert_eq!(parser.statistics().bytes_received, 8);
    }
}
