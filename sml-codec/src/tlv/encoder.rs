//! TLV encoder for SML
//!
//! Builds SML payloads element by element, e.g. for test fixtures and meter
//! simulators. Structure is up to the caller: write a list header with the
//! element count, then the elements.

use crate::error::{SmlError, SmlResult};
use crate::tlv::types::{TlvType, TypeLength, END_OF_MESSAGE};

/// TLV encoder writing into an owned buffer
#[derive(Debug, Default)]
pub struct TlvEncoder {
    buffer: Vec<u8>,
}

impl TlvEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode an octet string
    pub fn encode_octet_string(&mut self, value: &[u8]) -> &mut Self {
        self.buffer
            .extend(TypeLength::encode(TlvType::OctetString, value.len()));
        self.buffer.extend_from_slice(value);
        self
    }

    /// Encode an absent optional element
    pub fn encode_absent(&mut self) -> &mut Self {
        self.buffer
            .extend(TypeLength::encode(TlvType::OctetString, 0));
        self
    }

    /// Encode an optional octet string
    pub fn encode_optional(&mut self, value: Option<&[u8]>) -> &mut Self {
        match value {
            Some(bytes) => self.encode_octet_string(bytes),
            None => self.encode_absent(),
        }
    }

    /// Encode the `endOfSmlMsg` marker
    pub fn encode_end_of_message(&mut self) -> &mut Self {
        self.buffer.push(END_OF_MESSAGE);
        self
    }

    pub fn encode_bool(&mut self, value: bool) -> &mut Self {
        self.buffer.extend(TypeLength::encode(TlvType::Boolean, 1));
        self.buffer.push(if value { 0x01 } else { 0x00 });
        self
    }

    /// Encode a signed integer with the given width in bytes (1, 2, 4 or 8)
    pub fn encode_integer(&mut self, value: i64, width: usize) -> SmlResult<&mut Self> {
        let width = Self::check_width(width)?;
        let min = if width == 8 { i64::MIN } else { -(1i64 << (8 * width - 1)) };
        let max = if width == 8 { i64::MAX } else { (1i64 << (8 * width - 1)) - 1 };
        if value < min || value > max {
            return Err(SmlError::InvalidData(format!(
                "{} does not fit into {} signed bytes",
                value, width
            )));
        }
        self.buffer.extend(TypeLength::encode(TlvType::Integer, width));
        self.buffer.extend_from_slice(&value.to_be_bytes()[8 - width..]);
        Ok(self)
    }

    /// Encode an unsigned integer with the given width in bytes (1, 2, 4 or 8)
    pub fn encode_unsigned(&mut self, value: u64, width: usize) -> SmlResult<&mut Self> {
        let width = Self::check_width(width)?;
        if width < 8 && value >> (8 * width) != 0 {
            return Err(SmlError::InvalidData(format!(
                "{} does not fit into {} unsigned bytes",
                value, width
            )));
        }
        self.buffer.extend(TypeLength::encode(TlvType::Unsigned, width));
        self.buffer.extend_from_slice(&value.to_be_bytes()[8 - width..]);
        Ok(self)
    }

    /// Encode a list header; the caller writes `count` elements afterwards
    pub fn encode_list(&mut self, count: usize) -> &mut Self {
        self.buffer.extend(TypeLength::encode(TlvType::List, count));
        self
    }

    /// Append raw bytes
    pub fn encode_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(bytes);
        self
    }

    fn check_width(width: usize) -> SmlResult<usize> {
        match width {
            1 | 2 | 4 | 8 => Ok(width),
            _ => Err(SmlError::InvalidData(format!(
                "Unsupported integer width: {}",
                width
            ))),
        }
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
