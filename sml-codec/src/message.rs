//! Typed views over decoded SML messages
//!
//! The decoder produces generic [`SmlValue`] trees. These wrappers give names
//! to the fields consumers actually read. They never fail on missing fields:
//! truncated frames decode to partial structures, so every accessor returns an
//! `Option`.

use crate::error::{SmlError, SmlResult};
use crate::schema::{message_ids, names, Schema};
use serde::{Deserialize, Serialize};
use sml_core::{ObisCode, Reading, SmlStruct, SmlValue};

/// Kind of an SML message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    OpenResponse,
    CloseResponse,
    GetListResponse,
    /// A message without a dedicated schema node, decoded as generic lists
    Other(u64),
}

impl MessageKind {
    pub fn from_id(id: u64) -> Self {
        match id {
            message_ids::OPEN_RESPONSE => MessageKind::OpenResponse,
            message_ids::CLOSE_RESPONSE => MessageKind::CloseResponse,
            message_ids::GET_LIST_RESPONSE => MessageKind::GetListResponse,
            other => MessageKind::Other(other),
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            MessageKind::OpenResponse => message_ids::OPEN_RESPONSE,
            MessageKind::CloseResponse => message_ids::CLOSE_RESPONSE,
            MessageKind::GetListResponse => message_ids::GET_LIST_RESPONSE,
            MessageKind::Other(id) => *id,
        }
    }

    /// Field name the body is stored under inside `messageBody`
    pub fn body_field(&self) -> &'static str {
        match self {
            MessageKind::OpenResponse => names::OPEN_RESPONSE,
            MessageKind::CloseResponse => names::CLOSE_RESPONSE,
            MessageKind::GetListResponse => names::GET_LIST_RESPONSE,
            MessageKind::Other(_) => Schema::fallback_name(names::MESSAGE_ID),
        }
    }
}

/// One decoded `smlMessage`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmlMessage {
    fields: SmlStruct,
}

impl SmlMessage {
    pub fn new(fields: SmlStruct) -> Self {
        Self { fields }
    }

    /// Get all decoded fields
    pub fn fields(&self) -> &SmlStruct {
        &self.fields
    }

    pub fn transaction_id(&self) -> Option<&[u8]> {
        self.fields.get(names::TRANSACTION_ID).and_then(SmlValue::as_bytes)
    }

    pub fn group_no(&self) -> Option<u64> {
        self.fields.get(names::GROUP_NO).and_then(SmlValue::as_u64)
    }

    pub fn abort_on_error(&self) -> Option<u64> {
        self.fields.get(names::ABORT_ON_ERROR).and_then(SmlValue::as_u64)
    }

    /// Get the `messageBody` struct
    pub fn message_body(&self) -> Option<&SmlValue> {
        self.fields.get(names::MESSAGE_BODY)
    }

    pub fn message_id(&self) -> Option<u64> {
        self.message_body()?.get(names::MESSAGE_ID)?.as_u64()
    }

    pub fn kind(&self) -> Option<MessageKind> {
        self.message_id().map(MessageKind::from_id)
    }

    /// Get the body selected by the message id
    pub fn body(&self) -> Option<&SmlValue> {
        let kind = self.kind()?;
        self.message_body()?.get(kind.body_field())
    }

    /// Get the body as a `GetListResponse`
    pub fn get_list_response(&self) -> Option<GetListResponse<'_>> {
        if self.kind()? != MessageKind::GetListResponse {
            return None;
        }
        self.body()?.as_struct().map(|fields| GetListResponse { fields })
    }
}

/// Decoded `smlFile`: all messages of one CRC-checked frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmlFile {
    messages: Vec<SmlMessage>,
}

impl SmlFile {
    pub fn new(messages: Vec<SmlMessage>) -> Self {
        Self { messages }
    }

    /// Build from the value decoded for the `smlFile` node
    ///
    /// Top-level elements that are not structs cannot be messages and are
    /// dropped.
    pub fn from_value(value: SmlValue) -> SmlResult<Self> {
        let SmlValue::List(items) = value else {
            return Err(SmlError::InvalidData(format!(
                "smlFile must decode to a list, got {}",
                value.type_name()
            )));
        };

        let messages = items
            .into_iter()
            .filter_map(|item| match item {
                SmlValue::Struct(fields) => Some(SmlMessage::new(fields)),
                other => {
                    log::debug!("Dropping top-level {} outside of a message", other.type_name());
                    None
                }
            })
            .collect();
        Ok(Self { messages })
    }

    pub fn messages(&self) -> &[SmlMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<SmlMessage> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate over all `GetListResponse` bodies
    pub fn get_list_responses(&self) -> impl Iterator<Item = GetListResponse<'_>> {
        self.messages.iter().filter_map(SmlMessage::get_list_response)
    }
}

/// View of a `GetListResponse` body
#[derive(Debug, Clone, Copy)]
pub struct GetListResponse<'a> {
    fields: &'a SmlStruct,
}

impl<'a> GetListResponse<'a> {
    pub fn client_id(&self) -> Option<&'a [u8]> {
        self.fields.get(names::CLIENT_ID).and_then(SmlValue::as_bytes)
    }

    pub fn server_id(&self) -> Option<&'a [u8]> {
        self.fields.get(names::SERVER_ID).and_then(SmlValue::as_bytes)
    }

    pub fn list_name(&self) -> Option<&'a [u8]> {
        self.fields.get(names::LIST_NAME).and_then(SmlValue::as_bytes)
    }

    pub fn act_sensor_time(&self) -> Option<&'a SmlValue> {
        self.fields.get(names::ACT_SENSOR_TIME)
    }

    pub fn act_gateway_time(&self) -> Option<&'a SmlValue> {
        self.fields.get(names::ACT_GATEWAY_TIME)
    }

    /// Iterate over the `valList` entries
    pub fn entries(&self) -> impl Iterator<Item = ListEntry<'a>> + use<'a> {
        self.fields
            .get(names::VAL_LIST)
            .and_then(SmlValue::as_list)
            .unwrap_or(&[])
            .iter()
            .filter_map(SmlValue::as_struct)
            .map(|fields| ListEntry { fields })
    }

    /// Find the entry with the given OBIS code
    pub fn entry(&self, obis: ObisCode) -> Option<ListEntry<'a>> {
        self.entries().find(|entry| entry.obj_name() == Some(obis))
    }
}

/// View of one `val` entry of a `valList`
#[derive(Debug, Clone, Copy)]
pub struct ListEntry<'a> {
    fields: &'a SmlStruct,
}

impl<'a> ListEntry<'a> {
    /// Get the OBIS code, if `objName` is a 6-byte octet string
    pub fn obj_name(&self) -> Option<ObisCode> {
        let bytes = self.fields.get(names::OBJ_NAME)?.as_bytes()?;
        ObisCode::try_from(bytes).ok()
    }

    pub fn status(&self) -> Option<u64> {
        self.fields.get(names::STATUS).and_then(SmlValue::as_u64)
    }

    pub fn val_time(&self) -> Option<&'a SmlValue> {
        self.fields.get(names::VAL_TIME)
    }

    pub fn unit(&self) -> Option<u8> {
        self.fields
            .get(names::UNIT)
            .and_then(SmlValue::as_u64)
            .and_then(|unit| u8::try_from(unit).ok())
    }

    pub fn scaler(&self) -> Option<i8> {
        self.fields
            .get(names::SCALER)
            .and_then(SmlValue::as_i64)
            .and_then(|scaler| i8::try_from(scaler).ok())
    }

    pub fn value(&self) -> Option<&'a SmlValue> {
        self.fields.get(names::VALUE)
    }

    /// Convert to a reading
    ///
    /// Requires an OBIS code and an integer value. A missing scaler counts
    /// as 0.
    pub fn reading(&self) -> Option<Reading> {
        let obis = self.obj_name()?;
        let mantissa = self.value()?.as_i64()?;
        let reading = Reading::new(obis, mantissa, self.scaler().unwrap_or(0));
        Some(match self.unit() {
            Some(unit) => reading.with_unit(unit),
            None => reading,
        })
    }

    /// Get the scaled value (`value * 10^scaler`)
    pub fn scaled_value(&self) -> Option<f64> {
        self.reading().map(|reading| reading.value())
    }
}
