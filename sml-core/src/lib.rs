//! Core types and utilities for the Smart Message Language (SML)
//!
//! This crate provides the error type, OBIS codes, the decoded value model and
//! parser events shared by the SML codec and session crates.

pub mod error;
pub mod event;
pub mod obis_code;
pub mod datatypes;

pub use error::{SmlError, SmlResult};
pub use event::SmlEvent;
pub use obis_code::ObisCode;
pub use datatypes::*;
