//! Rust implementation of the Smart Message Language (SML)
//!
//! Decodes the byte stream electricity meters push out of their optical or
//! wired interface into typed SML messages.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `sml-core`: Error type, OBIS codes, decoded values and events
//! - `sml-codec`: Structure schema, TLV decoding/encoding, message views
//! - `sml-session`: Escape-sequence framing, CRC16, frame assembler
//!
//! # Implementation Status
//!
//! ## ✅ 已完成
//! - 转义序列帧解析与 CRC16 校验
//! - 基于 schema 的 TLV 解码（判别字段动态选择结构）
//! - OpenResponse / CloseResponse / GetListResponse
//! - 异步字节流读取（任意 AsyncRead）
//!
//! ## 📋 待实现
//! - GetProfileListResponse 专用结构
//! - 版本 2 块传输
//!
//! # Usage
//!
//! ```no_run
//! use sml::{MeterReadings, SmlReader};
//!
//! # async fn run() -> sml::SmlResult<()> {
//! let port = tokio::io::stdin();
//! let mut reader = SmlReader::new(port);
//! while let Some(file) = reader.next_file().await? {
//!     let readings = MeterReadings::from_file(&file);
//!     println!("{:?}", readings.power_w);
//! }
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod reading;

#[cfg(test)]
mod test_fixtures;

pub use reader::SmlReader;
pub use reading::{readings, MeterReadings, ACTIVE_POWER, EXPORT_ENERGY_TOTAL, IMPORT_ENERGY_TOTAL};
pub use sml_codec::{GetListResponse, ListEntry, MessageKind, Schema, SmlFile, SmlMessage};
pub use sml_core::{ObisCode, Reading, SmlError, SmlEvent, SmlResult, SmlValue};
pub use sml_session::{EventSink, ParserSettings, SmlFrame, SmlParser, SmlStatistics};
