//! TLV processing module for the Smart Message Language
//!
//! This crate provides the SML structure schema, the recursive TLV decoder
//! driven by it, a TLV encoder and typed views over decoded messages.
//!
//! # TODO
//!
//! ## TLV 编码/解码
//! - [x] 类型-长度字段（含多字节长度）
//! - [x] octet string / boolean / integer / unsigned / list
//! - [x] 可选字段（absent）与 endOfSmlMsg 标记
//! - [x] 基于判别字段的 schema 选择（messageId, timeId）
//!
//! ## 消息
//! - [x] OpenResponse / CloseResponse / GetListResponse
//! - [ ] GetProfileListResponse 专用 schema（目前按通用 list 解码）

pub mod error;
pub mod schema;
pub mod tlv;
pub mod message;

pub use error::{SmlError, SmlResult};
pub use schema::{FieldDescriptor, NodeKind, NodeShape, Schema, SchemaNode};
pub use tlv::{TlvDecoder, TlvEncoder, TlvType, TypeLength};
pub use message::{GetListResponse, ListEntry, MessageKind, SmlFile, SmlMessage};
