//! Error types shared with `sml-core`

pub use sml_core::error::{SmlError, SmlResult};
