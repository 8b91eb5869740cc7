//! Decoded SML values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fields of a decoded struct, keyed by their (resolved) schema name
pub type SmlStruct = BTreeMap<String, SmlValue>;

/// Value produced by the TLV decoder
///
/// Optional SML elements that are not present on the wire decode to
/// `OctetString(None)`, which is distinct from an empty byte string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmlValue {
    /// Octet string, `None` when the optional element is absent
    OctetString(#[serde(with = "serde_bytes")] Option<Vec<u8>>),
    /// Boolean value
    Boolean(bool),
    /// Signed integer (up to 64 bits on the wire)
    Integer(i64),
    /// Unsigned integer (up to 64 bits on the wire)
    Unsigned(u64),
    /// List node of the schema, elements in wire order
    List(Vec<SmlValue>),
    /// Struct node of the schema
    Struct(SmlStruct),
}

impl SmlValue {
    /// Create an absent optional value
    pub fn absent() -> Self {
        SmlValue::OctetString(None)
    }

    /// Create an octet string value
    pub fn octet_string(bytes: impl Into<Vec<u8>>) -> Self {
        SmlValue::OctetString(Some(bytes.into()))
    }

    /// Check whether this is an absent optional value
    pub fn is_absent(&self) -> bool {
        matches!(self, SmlValue::OctetString(None))
    }

    /// Get the bytes of a present octet string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SmlValue::OctetString(Some(bytes)) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SmlValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Get the value as a signed integer
    ///
    /// Unsigned values are converted when they fit into an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SmlValue::Integer(value) => Some(*value),
            SmlValue::Unsigned(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// Get the value as an unsigned integer
    ///
    /// Signed values are converted when they are not negative.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            SmlValue::Unsigned(value) => Some(*value),
            SmlValue::Integer(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SmlValue]> {
        match self {
            SmlValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&SmlStruct> {
        match self {
            SmlValue::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a field of a struct value
    pub fn get(&self, field: &str) -> Option<&SmlValue> {
        self.as_struct().and_then(|fields| fields.get(field))
    }

    /// Get a human-readable type name
    pub fn type_name(&self) -> &'static str {
        match self {
            SmlValue::OctetString(_) => "octet-string",
            SmlValue::Boolean(_) => "boolean",
            SmlValue::Integer(_) => "integer",
            SmlValue::Unsigned(_) => "unsigned",
            SmlValue::List(_) => "list",
            SmlValue::Struct(_) => "struct",
        }
    }
}

impl fmt::Display for SmlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmlValue::OctetString(None) => write!(f, "<absent>"),
            SmlValue::OctetString(Some(bytes)) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            SmlValue::Boolean(value) => write!(f, "{}", value),
            SmlValue::Integer(value) => write!(f, "{}", value),
            SmlValue::Unsigned(value) => write!(f, "{}", value),
            SmlValue::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            SmlValue::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
