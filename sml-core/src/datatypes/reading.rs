//! Scaled meter readings
//!
//! SML transmits every reading as an integer mantissa plus a base-10 scaler
//! exponent. The real value is `mantissa * 10^scaler`.
//!
//! # Usage
//!
//! ```rust
//! use sml_core::{ObisCode, Reading};
//!
//! // 1234 * 10^-1 W
//! let reading = Reading::new(ObisCode::new(1, 0, 16, 7, 0, 255), 1234, -1);
//! assert_eq!(reading.value(), 123.4);
//! ```

use crate::obis_code::ObisCode;
use serde::{Deserialize, Serialize};

/// A single reading identified by its OBIS code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reading {
    /// Quantity identifier
    pub obis: ObisCode,
    /// Integer value as transmitted
    pub mantissa: i64,
    /// Power-of-ten exponent
    pub scaler: i8,
    /// Unit code as transmitted (DLMS unit table, e.g. 0x1B = W, 0x1E = Wh)
    pub unit: Option<u8>,
}

impl Reading {
    /// Create a reading without unit information
    pub fn new(obis: ObisCode, mantissa: i64, scaler: i8) -> Self {
        Self {
            obis,
            mantissa,
            scaler,
            unit: None,
        }
    }

    /// Attach a unit code
    pub fn with_unit(mut self, unit: u8) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Get the scaled value (`mantissa * 10^scaler`)
    pub fn value(&self) -> f64 {
        scale(self.mantissa, self.scaler)
    }
}

/// Apply a base-10 scaler to a mantissa
///
/// Negative scalers divide by an exact power of ten so the result is the
/// double closest to the decimal value (1234 with scaler -1 is exactly 123.4).
pub fn scale(mantissa: i64, scaler: i8) -> f64 {
    let factor = 10f64.powi(i32::from(scaler).abs());
    if scaler < 0 {
        mantissa as f64 / factor
    } else {
        mantissa as f64 * factor
    }
}
