//! Error types for the SML session layer

pub use sml_core::error::{SmlError, SmlResult};
