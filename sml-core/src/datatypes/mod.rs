//! Data types produced by the SML decoder

pub mod value;
pub mod reading;

// Re-export types
pub use value::{SmlStruct, SmlValue};
pub use reading::{scale, Reading};
