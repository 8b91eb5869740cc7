//! Parser configuration

use crate::error::{SmlError, SmlResult};
use crate::framing::escape::ESCAPE_SEQUENCE_LEN;
use serde::{Deserialize, Serialize};
use sml_codec::tlv::DEFAULT_MAX_DEPTH;

/// Default upper bound for the frame buffer
pub const DEFAULT_MAX_BUFFER_LEN: usize = 64 * 1024;

/// Settings of an [`SmlParser`](crate::framing::SmlParser)
///
/// Serializable so that applications can embed it in their own configuration
/// file; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Largest number of bytes buffered for one frame
    pub max_buffer_len: usize,
    /// Deepest list nesting accepted by the TLV decoder
    pub max_nesting_depth: usize,
}

impl ParserSettings {
    /// Check that the settings can be used
    pub fn validate(&self) -> SmlResult<()> {
        if self.max_buffer_len < 2 * ESCAPE_SEQUENCE_LEN {
            return Err(SmlError::InvalidData(format!(
                "max_buffer_len must be at least {}, got {}",
                2 * ESCAPE_SEQUENCE_LEN,
                self.max_buffer_len
            )));
        }
        if self.max_nesting_depth == 0 {
            return Err(SmlError::InvalidData(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
            max_nesting_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = ParserSettings::default();
        assert_eq!(settings.max_buffer_len, 65536);
        assert_eq!(settings.max_nesting_depth, 16);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_small_values() {
        let settings = ParserSettings {
            max_buffer_len: 15,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SmlError::InvalidData(_))));

        let settings = ParserSettings {
            max_nesting_depth: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = ParserSettings {
            max_buffer_len: 16,
            max_nesting_depth: 1,
        };
        assert!(settings.validate().is_ok());
    }
}
