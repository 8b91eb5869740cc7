use crate::error::{SmlError, SmlResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extended notation "A-B:C.D.E*F" with optional "*F"
static EXTENDED_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3})-(\d{1,3}):(\d{1,3})\.(\d{1,3})\.(\d{1,3})(?:\*(\d{1,3}))?$")
        .expect("static OBIS regex is valid")
});

/// OBIS (Object Identification System) code identifying a metered quantity
///
/// OBIS codes are 6-byte identifiers. In SML they are transmitted as the
/// `objName` octet string of every `valList` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObisCode {
    bytes: [u8; 6],
}

impl ObisCode {
    /// Create a new OBIS code from individual bytes
    ///
    /// # Arguments
    ///
    /// * `a` - First byte (A value, medium)
    /// * `b` - Second byte (B value, channel)
    /// * `c` - Third byte (C value, quantity)
    /// * `d` - Fourth byte (D value, processing)
    /// * `e` - Fifth byte (E value, tariff)
    /// * `f` - Sixth byte (F value, storage)
    pub const fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            bytes: [a, b, c, d, e, f],
        }
    }

    /// Parse an OBIS code from string format
    ///
    /// Supports formats like:
    /// - "1.0.16.7.0.255"
    /// - "1-0:16.7.0*255"
    /// - "1-0:16.7.0" (F defaults to 255)
    ///
    /// # Returns
    ///
    /// Returns `Ok(ObisCode)` if parsing succeeds, `Err(SmlError)` otherwise
    pub fn from_string(s: &str) -> SmlResult<Self> {
        if let Ok(code) = Self::parse_dot_format(s) {
            return Ok(code);
        }

        if let Ok(code) = Self::parse_extended_format(s) {
            return Ok(code);
        }

        Err(SmlError::InvalidData(format!("Invalid OBIS code format: {}", s)))
    }

    fn parse_dot_format(s: &str) -> SmlResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 6 {
            return Err(SmlError::InvalidData("Expected 6 dot-separated values".to_string()));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = Self::parse_group(part)?;
        }

        Ok(Self { bytes })
    }

    fn parse_extended_format(s: &str) -> SmlResult<Self> {
        let caps = EXTENDED_FORMAT
            .captures(s)
            .ok_or_else(|| SmlError::InvalidData(format!("Not an extended OBIS code: {}", s)))?;

        let mut bytes = [0xFFu8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            if let Some(group) = caps.get(i + 1) {
                *byte = Self::parse_group(group.as_str())?;
            }
        }

        Ok(Self { bytes })
    }

    fn parse_group(part: &str) -> SmlResult<u8> {
        part.parse::<u8>()
            .map_err(|_| SmlError::InvalidData(format!("Invalid byte value: {}", part)))
    }

    /// Get the OBIS code as a byte array
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.bytes
    }

    /// Get the OBIS code as a copied byte array
    pub fn to_bytes(&self) -> [u8; 6] {
        self.bytes
    }

    pub fn a(&self) -> u8 {
        self.bytes[0]
    }

    pub fn b(&self) -> u8 {
        self.bytes[1]
    }

    pub fn c(&self) -> u8 {
        self.bytes[2]
    }

    pub fn d(&self) -> u8 {
        self.bytes[3]
    }

    pub fn e(&self) -> u8 {
        self.bytes[4]
    }

    pub fn f(&self) -> u8 {
        self.bytes[5]
    }
}

impl TryFrom<&[u8]> for ObisCode {
    type Error = SmlError;

    /// Convert an `objName` octet string; it must be exactly 6 bytes long
    fn try_from(value: &[u8]) -> SmlResult<Self> {
        let bytes: [u8; 6] = value.try_into().map_err(|_| {
            SmlError::InvalidData(format!("OBIS code must be 6 bytes, got {}", value.len()))
        })?;
        Ok(Self { bytes })
    }
}

impl From<[u8; 6]> for ObisCode {
    fn from(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }
}

impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}:{}.{}.{}*{}",
            self.bytes[0], self.bytes[1], self.bytes[2],
            self.bytes[3], self.bytes[4], self.bytes[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obis_code_new() {
        let code = ObisCode::new(1, 0, 16, 7, 0, 255);
        assert_eq!(code.a(), 1);
        assert_eq!(code.c(), 16);
        assert_eq!(code.f(), 255);
    }

    #[test]
    fn test_obis_code_from_dot_string() {
        let code = ObisCode::from_string("1.0.1.8.0.255").unwrap();
        assert_eq!(code, ObisCode::new(1, 0, 1, 8, 0, 255));
    }

    #[test]
    fn test_obis_code_from_extended_string() {
        let code = ObisCode::from_string("1-0:16.7.0*255").unwrap();
        assert_eq!(code, ObisCode::new(1, 0, 16, 7, 0, 255));

        let code = ObisCode::from_string("1-0:2.8.0").unwrap();
        assert_eq!(code, ObisCode::new(1, 0, 2, 8, 0, 255));
    }

    #[test]
    fn test_obis_code_rejects_garbage() {
        assert!(ObisCode::from_string("1.0.16.7.0").is_err());
        assert!(ObisCode::from_string("1-0:16.7.0*256").is_err());
        assert!(ObisCode::from_string("power").is_err());
    }

    #[test]
    fn test_obis_code_try_from_slice() {
        let code = ObisCode::try_from(&[0x01, 0x00, 0x10, 0x07, 0x00, 0xFF][..]).unwrap();
        assert_eq!(code, ObisCode::new(1, 0, 16, 7, 0, 255));
        assert_eq!(code.to_bytes(), [0x01, 0x00, 0x10, 0x07, 0x00, 0xFF]);
        assert_eq!(ObisCode::from(code.to_bytes()), code);
        assert!(ObisCode::try_from(&[0x01, 0x00][..]).is_err());
    }

    #[test]
    fn test_obis_code_display() {
        let code = ObisCode::new(1, 0, 1, 8, 0, 255);
        assert_eq!(format!("{}", code), "1-0:1.8.0*255");
    }
}
