//! Schema-driven TLV decoder for SML

use crate::error::{SmlError, SmlResult};
use crate::schema::{names, FieldDescriptor, NodeShape, Schema};
use crate::tlv::types::{TlvType, TypeLength};
use bytes::{Buf, Bytes};
use sml_core::{SmlEvent, SmlStruct, SmlValue};

/// Default limit for nested lists
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Outcome of decoding one element
enum Element {
    Value(SmlValue),
    /// Reserved type bits; payload skipped
    Skipped,
    /// Data ended inside the element
    Truncated,
}

/// TLV decoder consuming a CRC-checked SML payload
///
/// The decoder walks the payload by recursive descent. What each element means
/// is taken from the [`Schema`]; the wire only carries the primitive type.
/// Running out of data is not an error: the containers decoded so far are
/// returned and callers must check for the fields they need.
pub struct TlvDecoder<'s> {
    buffer: Bytes,
    schema: &'s Schema,
    max_depth: usize,
    events: Vec<SmlEvent>,
}

impl<'s> TlvDecoder<'s> {
    /// Create a new decoder
    pub fn new(buffer: impl Into<Bytes>, schema: &'s Schema) -> Self {
        Self {
            buffer: buffer.into(),
            schema,
            max_depth: DEFAULT_MAX_DEPTH,
            events: Vec::new(),
        }
    }

    /// Limit how deeply lists may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decode the whole payload as `smlFile`
    pub fn decode_file(&mut self) -> SmlResult<SmlValue> {
        self.decode(names::SML_FILE, None)
    }

    /// Decode elements as the given schema node
    ///
    /// # Arguments
    /// * `node_name` - Schema node to decode
    /// * `budget` - Number of elements to read, `None` to read until the data ends
    ///
    /// # Returns
    /// A `SmlValue::List` or `SmlValue::Struct` depending on the node kind
    pub fn decode(&mut self, node_name: &str, budget: Option<usize>) -> SmlResult<SmlValue> {
        self.decode_node(node_name, budget, 0)
    }

    fn decode_node(
        &mut self,
        node_name: &str,
        mut budget: Option<usize>,
        depth: usize,
    ) -> SmlResult<SmlValue> {
        if depth >= self.max_depth {
            return Err(SmlError::Protocol(format!(
                "Nesting deeper than {} levels at node {}",
                self.max_depth, node_name
            )));
        }

        let node = *self.schema.lookup(node_name)?;
        let mut list = Vec::new();
        let mut fields = SmlStruct::new();
        let mut position = 0;

        while self.buffer.has_remaining() && budget != Some(0) {
            let target = match node.shape {
                NodeShape::List(element) => element,
                NodeShape::Struct(descriptors) => match descriptors.get(position) {
                    Some(FieldDescriptor::Node(name)) => *name,
                    Some(FieldDescriptor::Discriminant(field)) => {
                        self.schema.resolve_discriminant(*field, fields.get(*field))?
                    }
                    None => {
                        return Err(SmlError::Protocol(format!(
                            "Struct {} has only {} fields",
                            node.name,
                            descriptors.len()
                        )));
                    }
                },
            };

            let Some(tl) = TypeLength::read(&mut self.buffer)? else {
                log::debug!("Data ended inside a type-length field of {}", node.name);
                break;
            };

            match self.decode_element(&tl, target, depth)? {
                Element::Value(value) => match node.shape {
                    NodeShape::List(_) => list.push(value),
                    NodeShape::Struct(_) => {
                        fields.insert(target.to_string(), value);
                    }
                },
                Element::Skipped => {}
                Element::Truncated => break,
            }

            position += 1;
            budget = budget.map(|remaining| remaining - 1);
        }

        Ok(match node.shape {
            NodeShape::List(_) => SmlValue::List(list),
            NodeShape::Struct(_) => SmlValue::Struct(fields),
        })
    }

    fn decode_element(&mut self, tl: &TypeLength, target: &str, depth: usize) -> SmlResult<Element> {
        if tl.tlv_type == TlvType::List {
            let value = self.decode_node(target, Some(tl.length), depth + 1)?;
            return Ok(Element::Value(value));
        }

        if tl.is_end_of_message() {
            return Ok(Element::Value(SmlValue::octet_string(vec![0x00])));
        }

        let len = tl.payload_len().ok_or_else(|| {
            SmlError::Protocol(format!(
                "Type-length field 0x{:02X} declares {} bytes but occupies {}",
                tl.first_byte, tl.length, tl.header_len
            ))
        })?;

        if self.buffer.remaining() < len {
            log::debug!(
                "Payload of {} truncated: need {} bytes, have {}",
                target,
                len,
                self.buffer.remaining()
            );
            self.buffer.clear();
            return Ok(Element::Truncated);
        }
        let payload = self.buffer.split_to(len);

        let value = match tl.tlv_type {
            TlvType::OctetString if payload.is_empty() => SmlValue::absent(),
            TlvType::OctetString => SmlValue::octet_string(payload.to_vec()),
            TlvType::Boolean => SmlValue::Boolean(payload.iter().any(|&b| b != 0)),
            TlvType::Integer => SmlValue::Integer(Self::read_signed(&payload, target)?),
            TlvType::Unsigned => SmlValue::Unsigned(Self::read_unsigned(&payload, target)?),
            TlvType::Reserved(_) => {
                log::warn!(
                    "Unknown or reserved type-length field: 0x{:02X}",
                    tl.first_byte
                );
                self.events.push(SmlEvent::UnknownTlvTag(tl.first_byte));
                return Ok(Element::Skipped);
            }
            TlvType::List => unreachable!("lists are decoded recursively"),
        };
        Ok(Element::Value(value))
    }

    /// Big-endian two's complement integer of up to 8 bytes
    fn read_signed(payload: &[u8], target: &str) -> SmlResult<i64> {
        Self::check_width(payload, target)?;
        let init: i64 = match payload.first() {
            Some(&msb) if msb & 0x80 != 0 => -1,
            _ => 0,
        };
        Ok(payload
            .iter()
            .fold(init, |acc, &byte| (acc << 8) | i64::from(byte)))
    }

    /// Big-endian unsigned integer of up to 8 bytes
    fn read_unsigned(payload: &[u8], target: &str) -> SmlResult<u64> {
        Self::check_width(payload, target)?;
        Ok(payload
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)))
    }

    fn check_width(payload: &[u8], target: &str) -> SmlResult<()> {
        if payload.len() > 8 {
            return Err(SmlError::Protocol(format!(
                "Integer {} is {} bytes wide, at most 8 supported",
                target,
                payload.len()
            )));
        }
        Ok(())
    }

    /// Take the events reported while decoding
    pub fn take_events(&mut self) -> Vec<SmlEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }
}
