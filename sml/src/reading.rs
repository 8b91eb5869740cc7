//! Meter readings by OBIS code

use serde::{Deserialize, Serialize};
use sml_codec::SmlFile;
use sml_core::{ObisCode, Reading};

/// Total imported active energy (A+), Wh
pub const IMPORT_ENERGY_TOTAL: ObisCode = ObisCode::new(1, 0, 1, 8, 0, 255);
/// Total exported active energy (A-), Wh
pub const EXPORT_ENERGY_TOTAL: ObisCode = ObisCode::new(1, 0, 2, 8, 0, 255);
/// Instantaneous active power, W
pub const ACTIVE_POWER: ObisCode = ObisCode::new(1, 0, 16, 7, 0, 255);

/// List all readings of a file
///
/// Only `valList` entries with an OBIS code and an integer value are
/// readings; string entries such as the device id are skipped.
pub fn readings(file: &SmlFile) -> Vec<Reading> {
    let mut result = Vec::new();
    for response in file.get_list_responses() {
        result.extend(response.entries().filter_map(|entry| entry.reading()));
    }
    result
}

/// The three quantities most meters push on every cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterReadings {
    pub import_wh: Option<f64>,
    pub export_wh: Option<f64>,
    pub power_w: Option<f64>,
}

impl MeterReadings {
    pub fn from_file(file: &SmlFile) -> Self {
        let mut result = Self::default();
        result.update(file);
        result
    }

    /// Overwrite the values present in `file`
    ///
    /// # Returns
    /// Whether any value was present
    pub fn update(&mut self, file: &SmlFile) -> bool {
        let mut updated = false;
        for reading in readings(file) {
            let slot = match reading.obis {
                IMPORT_ENERGY_TOTAL => &mut self.import_wh,
                EXPORT_ENERGY_TOTAL => &mut self.export_wh,
                ACTIVE_POWER => &mut self.power_w,
                _ => continue,
            };
            *slot = Some(reading.value());
            updated = true;
        }
        updated
    }

    pub fn is_complete(&self) -> bool {
        self.import_wh.is_some() && self.export_wh.is_some() && self.power_w.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{meter_frame, UNIT_W, UNIT_WH};
    use sml_codec::MessageKind;
    use sml_session::SmlParser;

    fn parse(frame: &[u8]) -> SmlFile {
        let mut parser = SmlParser::new();
        for &byte in frame {
            if parser.feed(byte).unwrap() {
                return parser.take_sml_file().unwrap();
            }
        }
        panic!("frame did not complete");
    }

    #[test]
    fn test_power_end_to_end() {
        let file = parse(&meter_frame(&[(ACTIVE_POWER, UNIT_W, -1, 1234)]));
        let kinds: Vec<_> = file.messages().iter().filter_map(|m| m.kind()).collect();
        assert_eq!(
            kinds,
            vec![MessageKind::OpenResponse, MessageKind::GetListResponse, MessageKind::CloseResponse]
        );

        let readings = MeterReadings::from_file(&file);
        assert_eq!(readings.power_w, Some(123.4));
        assert_eq!(readings.import_wh, None);
        assert!(!readings.is_complete());
    }

    #[test]
    fn test_all_readings() {
        let file = parse(&meter_frame(&[
            (IMPORT_ENERGY_TOTAL, UNIT_WH, -1, 123_456_789),
            (EXPORT_ENERGY_TOTAL, UNIT_WH, 0, 42),
            (ACTIVE_POWER, UNIT_W, 0, -350),
            (ObisCode::new(1, 0, 36, 7, 0, 255), UNIT_W, 0, 100),
        ]));

        let readings = MeterReadings::from_file(&file);
        assert_eq!(readings.import_wh, Some(12_345_678.9));
        assert_eq!(readings.export_wh, Some(42.0));
        assert_eq!(readings.power_w, Some(-350.0));
        assert!(readings.is_complete());

        let all = super::readings(&file);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].unit, Some(UNIT_WH));
        assert_eq!(all[3].obis.to_string(), "1-0:36.7.0*255");
    }

    #[test]
    fn test_update_keeps_missing_values() {
        let mut readings = MeterReadings::from_file(&parse(&meter_frame(&[(IMPORT_ENERGY_TOTAL, UNIT_WH, 0, 10)])));
        assert!(readings.update(&parse(&meter_frame(&[(ACTIVE_POWER, UNIT_W, 0, 5)]))));
        assert_eq!(readings.import_wh, Some(10.0));
        assert_eq!(readings.power_w, Some(5.0));

        assert!(!readings.update(&parse(&meter_frame(&[]))));
    }
}
