//! TLV encoding/decoding module

pub mod encoder;
pub mod decoder;
pub mod types;

pub use encoder::TlvEncoder;
pub use decoder::{TlvDecoder, DEFAULT_MAX_DEPTH};
pub use types::{TlvType, TypeLength};
