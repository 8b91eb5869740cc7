//! SML type-length field

use crate::error::{SmlError, SmlResult};
use bytes::Buf;

/// Bits of a type-length byte carrying the element type
pub const TYPE_MASK: u8 = 0x70;
/// Bits of a type-length byte carrying a length nibble
pub const LENGTH_MASK: u8 = 0x0F;
/// Set when another type-length byte follows
pub const MORE_FLAG: u8 = 0x80;
/// Single-byte type-length field marking `endOfSmlMsg`
pub const END_OF_MESSAGE: u8 = 0x00;

/// Longest type-length field accepted (16 length nibbles fill a 64-bit length)
const MAX_HEADER_LEN: usize = 8;

/// Element type encoded in the type bits of the first type-length byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlvType {
    OctetString,
    Boolean,
    Integer,
    Unsigned,
    List,
    /// Reserved type bits (0x10, 0x20, 0x30)
    Reserved(u8),
}

impl TlvType {
    /// Get the type from a type-length byte
    pub fn from_u8(tl: u8) -> Self {
        match tl & TYPE_MASK {
            0x00 => TlvType::OctetString,
            0x40 => TlvType::Boolean,
            0x50 => TlvType::Integer,
            0x60 => TlvType::Unsigned,
            0x70 => TlvType::List,
            other => TlvType::Reserved(other),
        }
    }

    /// Convert the type to its type bits
    pub fn to_u8(self) -> u8 {
        match self {
            TlvType::OctetString => 0x00,
            TlvType::Boolean => 0x40,
            TlvType::Integer => 0x50,
            TlvType::Unsigned => 0x60,
            TlvType::List => 0x70,
            TlvType::Reserved(bits) => bits & TYPE_MASK,
        }
    }
}

/// Decoded type-length field
///
/// For lists `length` is the number of elements. For every other type it is
/// the size of the whole element *including* the type-length field itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeLength {
    /// Element type from the first byte
    pub tlv_type: TlvType,
    /// Combined length nibbles
    pub length: usize,
    /// Number of bytes the type-length field occupies
    pub header_len: usize,
    /// First byte of the field as received
    pub first_byte: u8,
}

impl TypeLength {
    /// Read a type-length field from the front of `buf`
    ///
    /// Every byte with the `0x80` flag set is followed by another type-length
    /// byte. Follow-up bytes contribute their low nibble only when their type
    /// bits are zero, but always count toward the header size.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if `buf` ends inside the field
    pub fn read<B: Buf>(buf: &mut B) -> SmlResult<Option<Self>> {
        if !buf.has_remaining() {
            return Ok(None);
        }

        let first_byte = buf.get_u8();
        let mut tl = first_byte;
        let mut length = (tl & LENGTH_MASK) as usize;
        let mut header_len = 1;

        while tl & MORE_FLAG != 0 {
            if !buf.has_remaining() {
                return Ok(None);
            }
            if header_len == MAX_HEADER_LEN {
                return Err(SmlError::Protocol(format!(
                    "Type-length field starting with 0x{:02X} exceeds {} bytes",
                    first_byte, MAX_HEADER_LEN
                )));
            }
            tl = buf.get_u8();
            header_len += 1;
            if tl & TYPE_MASK == 0 {
                length = (length << 4) | (tl & LENGTH_MASK) as usize;
            }
        }

        Ok(Some(Self {
            tlv_type: TlvType::from_u8(first_byte),
            length,
            header_len,
            first_byte,
        }))
    }

    /// Check for the single-byte `endOfSmlMsg` marker
    pub fn is_end_of_message(&self) -> bool {
        self.header_len == 1 && self.first_byte == END_OF_MESSAGE
    }

    /// Number of payload bytes following the field
    ///
    /// `None` when the declared length is smaller than the field itself.
    pub fn payload_len(&self) -> Option<usize> {
        self.length.checked_sub(self.header_len)
    }

    /// Encode a type-length field
    ///
    /// # Arguments
    ///
    /// * `tlv_type` - Element type
    /// * `size` - Element count for lists, payload size for everything else
    pub fn encode(tlv_type: TlvType, size: usize) -> Vec<u8> {
        let mut header_len = 1;
        let length = loop {
            let length = match tlv_type {
                TlvType::List => size,
                _ => size + header_len,
            };
            if header_len >= 2 * std::mem::size_of::<usize>() || length >> (4 * header_len) == 0 {
                break length;
            }
            header_len += 1;
        };

        let mut result = Vec::with_capacity(header_len);
        for i in 0..header_len {
            let shift = 4 * (header_len - 1 - i);
            let mut byte = ((length >> shift) as u8) & LENGTH_MASK;
            if i == 0 {
                byte |= tlv_type.to_u8();
            }
            if i + 1 < header_len {
                byte |= MORE_FLAG;
            }
            result.push(byte);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(bytes: &[u8]) -> Option<TypeLength> {
        let mut buf = bytes;
        TypeLength::read(&mut buf).unwrap()
    }

    #[test]
    fn test_single_byte() {
        let tl = read(&[0x62]).unwrap();
        assert_eq!(tl.tlv_type, TlvType::Unsigned);
        assert_eq!(tl.length, 2);
        assert_eq!(tl.header_len, 1);
        assert_eq!(tl.payload_len(), Some(1));
    }

    #[test]
    fn test_continuation_length() {
        let tl = read(&[0x81, 0x05]).unwrap();
        assert_eq!(tl.tlv_type, TlvType::OctetString);
        assert_eq!(tl.length, 0x15);
        assert_eq!(tl.header_len, 2);
        assert_eq!(tl.payload_len(), Some(0x13));
    }

    #[test]
    fn test_continuation_with_type_bits_does_not_extend_length() {
        let tl = read(&[0x83, 0x72]).unwrap();
        assert_eq!(tl.length, 3);
        assert_eq!(tl.header_len, 2);
    }

    #[test]
    fn test_truncated_field() {
        assert_eq!(read(&[]), None);
        assert_eq!(read(&[0x81]), None);
    }

    #[test]
    fn test_overlong_field() {
        let mut buf = &[0x80u8; 12][..];
        assert!(TypeLength::read(&mut buf).is_err());
    }

    #[test]
    fn test_end_of_message() {
        let tl = read(&[0x00]).unwrap();
        assert!(tl.is_end_of_message());
        assert_eq!(tl.payload_len(), None);
        assert!(!read(&[0x01]).unwrap().is_end_of_message());
    }

    #[test]
    fn test_encode() {
        assert_eq!(TypeLength::encode(TlvType::Unsigned, 1), vec![0x62]);
        assert_eq!(TypeLength::encode(TlvType::List, 7), vec![0x77]);
        assert_eq!(TypeLength::encode(TlvType::OctetString, 0x13), vec![0x81, 0x05]);
        assert_eq!(TypeLength::encode(TlvType::List, 0x12), vec![0xF1, 0x02]);
        assert_eq!(TypeLength::encode(TlvType::OctetString, 14), vec![0x0F]);
        assert_eq!(TypeLength::encode(TlvType::OctetString, 15), vec![0x81, 0x01]);
    }

    #[test]
    fn test_encode_then_read_long_octet_string() {
        let header = TypeLength::encode(TlvType::OctetString, 300);
        let tl = read(&header).unwrap();
        assert_eq!(tl.header_len, header.len());
        assert_eq!(tl.payload_len(), Some(300));
    }
}
