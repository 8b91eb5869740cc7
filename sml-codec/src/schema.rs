//! SML structure schema
//!
//! Every SML element is a TLV value. Which *meaning* a list element has is not
//! on the wire; it comes from this schema. Each named node is either a list
//! (all elements share one node type) or a struct (elements map positionally
//! onto named fields).
//!
//! Some struct fields are discriminant placeholders: the concrete node depends
//! on a sibling that was decoded earlier in the same struct. For example the
//! second field of `messageBody` is `GetListResponse` when `messageId` was
//! 0x0701.
//!
//! # Standard grammar
//!
//! | Node | Kind | Children |
//! |---|---|---|
//! | smlFile | list | smlMessage |
//! | smlMessage | struct | transactionId, groupNo, abortOnError, messageBody, crc16, endOfSmlMsg |
//! | messageBody | struct | messageId, \[messageId\] |
//! | GetListResponse | struct | clientId, serverId, listName, actSensorTime, valList, listSignature, actGatewayTime |
//! | valList | list | val |
//! | val | struct | objName, status, valTime, unit, scaler, value, valueSignature |

use crate::error::{SmlError, SmlResult};
use once_cell::sync::Lazy;
use sml_core::SmlValue;
use std::collections::HashMap;

/// Suffix stripped from a discriminant name to get its fallback node
pub const DISCRIMINANT_SUFFIX: &str = "Id";

/// Node and field names of the standard grammar
pub mod names {
    pub const SML_FILE: &str = "smlFile";
    pub const SML_MESSAGE: &str = "smlMessage";
    pub const MESSAGE_BODY: &str = "messageBody";
    pub const MESSAGE: &str = "message";
    pub const OPEN_RESPONSE: &str = "OpenResponse";
    pub const CLOSE_RESPONSE: &str = "CloseResponse";
    pub const GET_LIST_RESPONSE: &str = "GetListResponse";
    pub const VAL_LIST: &str = "valList";
    pub const VAL: &str = "val";
    pub const SEC_INDEX: &str = "secIndex";
    pub const TIMESTAMP: &str = "timestamp";
    pub const LOCAL_TIMESTAMP: &str = "localTimestamp";

    pub const TRANSACTION_ID: &str = "transactionId";
    pub const GROUP_NO: &str = "groupNo";
    pub const ABORT_ON_ERROR: &str = "abortOnError";
    pub const CRC16: &str = "crc16";
    pub const END_OF_SML_MSG: &str = "endOfSmlMsg";
    pub const MESSAGE_ID: &str = "messageId";
    pub const TIME_ID: &str = "timeId";
    pub const CLIENT_ID: &str = "clientId";
    pub const SERVER_ID: &str = "serverId";
    pub const LIST_NAME: &str = "listName";
    pub const ACT_SENSOR_TIME: &str = "actSensorTime";
    pub const ACT_GATEWAY_TIME: &str = "actGatewayTime";
    pub const OBJ_NAME: &str = "objName";
    pub const STATUS: &str = "status";
    pub const VAL_TIME: &str = "valTime";
    pub const UNIT: &str = "unit";
    pub const SCALER: &str = "scaler";
    pub const VALUE: &str = "value";
}

/// `messageId` values with a dedicated schema node
pub mod message_ids {
    pub const OPEN_RESPONSE: u64 = 0x0101;
    pub const CLOSE_RESPONSE: u64 = 0x0201;
    pub const GET_LIST_RESPONSE: u64 = 0x0701;
}

/// Kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    List,
    Struct,
}

/// One field of a struct node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDescriptor {
    /// Literal field name; also the node used when the element is a list
    Node(&'static str),
    /// Resolve the node from the already decoded sibling with this name
    Discriminant(&'static str),
}

/// Children of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    /// Every element is decoded as the named node
    List(&'static str),
    /// Elements are matched to fields by position
    Struct(&'static [FieldDescriptor]),
}

/// Named node of the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaNode {
    pub name: &'static str,
    pub shape: NodeShape,
}

impl SchemaNode {
    pub const fn list(name: &'static str, element: &'static str) -> Self {
        Self {
            name,
            shape: NodeShape::List(element),
        }
    }

    pub const fn structure(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self {
            name,
            shape: NodeShape::Struct(fields),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.shape {
            NodeShape::List(_) => NodeKind::List,
            NodeShape::Struct(_) => NodeKind::Struct,
        }
    }
}

use FieldDescriptor::{Discriminant, Node};

const TIME_FIELDS: &[FieldDescriptor] = &[Node(names::TIME_ID), Discriminant(names::TIME_ID)];

static STANDARD_NODES: &[SchemaNode] = &[
    SchemaNode::list(names::SML_FILE, names::SML_MESSAGE),
    SchemaNode::structure(
        names::SML_MESSAGE,
        &[
            Node(names::TRANSACTION_ID),
            Node(names::GROUP_NO),
            Node(names::ABORT_ON_ERROR),
            Node(names::MESSAGE_BODY),
            Node(names::CRC16),
            Node(names::END_OF_SML_MSG),
        ],
    ),
    SchemaNode::structure(
        names::MESSAGE_BODY,
        &[Node(names::MESSAGE_ID), Discriminant(names::MESSAGE_ID)],
    ),
    SchemaNode::list(names::MESSAGE, names::MESSAGE),
    SchemaNode::structure(
        names::OPEN_RESPONSE,
        &[
            Node("codepage"),
            Node(names::CLIENT_ID),
            Node("reqFileId"),
            Node(names::SERVER_ID),
            Node("refTime"),
            Node("smlVersion"),
        ],
    ),
    SchemaNode::structure("refTime", TIME_FIELDS),
    SchemaNode::structure(names::CLOSE_RESPONSE, &[Node("globalSignature")]),
    SchemaNode::structure(
        names::GET_LIST_RESPONSE,
        &[
            Node(names::CLIENT_ID),
            Node(names::SERVER_ID),
            Node(names::LIST_NAME),
            Node(names::ACT_SENSOR_TIME),
            Node(names::VAL_LIST),
            Node("listSignature"),
            Node(names::ACT_GATEWAY_TIME),
        ],
    ),
    SchemaNode::structure(names::ACT_SENSOR_TIME, TIME_FIELDS),
    SchemaNode::structure(names::ACT_GATEWAY_TIME, TIME_FIELDS),
    SchemaNode::list(names::VAL_LIST, names::VAL),
    SchemaNode::structure(
        names::VAL,
        &[
            Node(names::OBJ_NAME),
            Node(names::STATUS),
            Node(names::VAL_TIME),
            Node(names::UNIT),
            Node(names::SCALER),
            Node(names::VALUE),
            Node("valueSignature"),
        ],
    ),
    SchemaNode::structure(names::VAL_TIME, TIME_FIELDS),
    SchemaNode::structure(names::SEC_INDEX, &[Node(names::SEC_INDEX)]),
    SchemaNode::structure(names::TIMESTAMP, &[Node(names::TIMESTAMP)]),
    SchemaNode::structure(
        names::LOCAL_TIMESTAMP,
        &[Node(names::TIMESTAMP), Node("localOffset"), Node("seasonTimeOffset")],
    ),
];

static STANDARD_DISCRIMINANTS: &[(&str, u64, &str)] = &[
    (names::MESSAGE_ID, message_ids::OPEN_RESPONSE, names::OPEN_RESPONSE),
    (names::MESSAGE_ID, message_ids::CLOSE_RESPONSE, names::CLOSE_RESPONSE),
    (names::MESSAGE_ID, message_ids::GET_LIST_RESPONSE, names::GET_LIST_RESPONSE),
    (names::TIME_ID, 1, names::SEC_INDEX),
    (names::TIME_ID, 2, names::TIMESTAMP),
    (names::TIME_ID, 3, names::LOCAL_TIMESTAMP),
];

static STANDARD_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        STANDARD_NODES.iter().copied(),
        STANDARD_DISCRIMINANTS.iter().copied(),
    )
});

/// Structure schema plus discriminant table
///
/// Immutable once built; the standard grammar is shared by all decoders.
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: HashMap<&'static str, SchemaNode>,
    discriminants: HashMap<(&'static str, u64), &'static str>,
}

impl Schema {
    /// Build a schema
    ///
    /// # Arguments
    /// * `nodes` - Node definitions; later definitions replace earlier ones
    /// * `discriminants` - `(field, value, node)` triples
    pub fn new(
        nodes: impl IntoIterator<Item = SchemaNode>,
        discriminants: impl IntoIterator<Item = (&'static str, u64, &'static str)>,
    ) -> Self {
        Self {
            nodes: nodes.into_iter().map(|node| (node.name, node)).collect(),
            discriminants: discriminants
                .into_iter()
                .map(|(field, value, node)| ((field, value), node))
                .collect(),
        }
    }

    /// Get the standard SML grammar
    pub fn standard() -> &'static Schema {
        &STANDARD_SCHEMA
    }

    /// Look up a node by name
    pub fn lookup(&self, name: &str) -> SmlResult<&SchemaNode> {
        self.nodes
            .get(name)
            .ok_or_else(|| SmlError::Protocol(format!("Unknown schema node: {}", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Resolve a discriminant placeholder to a node name
    ///
    /// # Arguments
    /// * `field` - Name of the discriminant sibling
    /// * `value` - The sibling's decoded value, if it was decoded
    ///
    /// # Returns
    /// The mapped node when the sibling holds an integer present in the table
    /// and the mapped node exists; otherwise the fallback node named by
    /// stripping [`DISCRIMINANT_SUFFIX`] from `field`. A fallback that is not
    /// part of the schema is a protocol error.
    pub fn resolve_discriminant(
        &self,
        field: &'static str,
        value: Option<&SmlValue>,
    ) -> SmlResult<&'static str> {
        let mapped = value
            .and_then(SmlValue::as_u64)
            .and_then(|value| self.discriminants.get(&(field, value)))
            .copied()
            .filter(|name| self.contains(name));
        if let Some(name) = mapped {
            return Ok(name);
        }

        let fallback = Self::fallback_name(field);
        if self.contains(fallback) {
            Ok(fallback)
        } else {
            Err(SmlError::Protocol(format!(
                "Cannot resolve {} = {} (no schema node {})",
                field,
                value.map(|v| v.to_string()).unwrap_or_else(|| "<missing>".to_string()),
                fallback
            )))
        }
    }

    /// Get the fallback node name of a discriminant
    pub fn fallback_name(field: &'static str) -> &'static str {
        field.strip_suffix(DISCRIMINANT_SUFFIX).unwrap_or(field)
    }
}
