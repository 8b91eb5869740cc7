//! Session layer for the Smart Message Language
//!
//! This crate turns a raw byte stream into CRC-checked SML files: escape
//! sequence framing, CRC16/X-25 calculation and the frame encoder used to
//! produce test streams.
//!
//! # TODO
//!
//! ## 帧处理
//! - [x] 转义序列检测（1B1B1B1B）
//! - [x] 起始/结束序列
//! - [x] CRC16 计算和验证（查表 + 逐位参考实现）
//! - [x] 帧编码（转义、填充、CRC）
//! - [x] 缓冲区上限
//! - [ ] 版本 2 块传输重组（目前只上报事件）
//!
//! ## 通用功能
//! - [x] 统计信息
//! - [x] 事件回调
//! - [x] 解析器配置

pub mod error;
pub mod framing;

pub use error::{SmlError, SmlResult};
pub use framing::*;
