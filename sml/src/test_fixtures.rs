//! Meter stream fixtures shared by the tests of this crate

use sml_codec::TlvEncoder;
use sml_core::ObisCode;
use sml_session::SmlFrame;

/// Unit codes used by the fixtures
pub const UNIT_WH: u8 = 0x1E;
pub const UNIT_W: u8 = 0x1B;

/// One `val` entry: OBIS code, unit, scaler, mantissa
pub type Entry = (ObisCode, u8, i8, i64);

fn message(encoder: &mut TlvEncoder, transaction_id: u8, message_id: u64, body: impl FnOnce(&mut TlvEncoder)) {
    encoder.encode_list(6).encode_octet_string(&[transaction_id]);
    encoder.encode_unsigned(0, 1).unwrap();
    encoder.encode_unsigned(0, 1).unwrap();
    encoder.encode_list(2);
    encoder.encode_unsigned(message_id, 2).unwrap();
    body(encoder);
    encoder.encode_unsigned(0, 2).unwrap();
    encoder.encode_end_of_message();
}

/// Payload of an SML file: OpenResponse, GetListResponse, CloseResponse
pub fn meter_file(entries: &[Entry]) -> Vec<u8> {
    let server_id = [0x0A, 0x01, 0x45, 0x4D, 0x48, 0x00];
    let mut encoder = TlvEncoder::new();

    message(&mut encoder, 1, 0x0101, |e| {
        e.encode_list(6)
            .encode_absent()
            .encode_absent()
            .encode_octet_string(&[0x00, 0x2A])
            .encode_octet_string(&server_id)
            .encode_absent()
            .encode_absent();
    });

    message(&mut encoder, 2, 0x0701, |e| {
        e.encode_list(7)
            .encode_absent()
            .encode_octet_string(&server_id)
            .encode_octet_string(&[0x01, 0x00, 0x62, 0x0A, 0xFF, 0xFF])
            .encode_list(2);
        e.encode_unsigned(1, 1).unwrap();
        e.encode_unsigned(123_456, 4).unwrap();
        e.encode_list(entries.len());
        for &(obis, unit, scaler, value) in entries {
            e.encode_list(7)
                .encode_octet_string(obis.as_bytes())
                .encode_absent()
                .encode_absent();
            e.encode_unsigned(u64::from(unit), 1).unwrap();
            e.encode_integer(i64::from(scaler), 1).unwrap();
            e.encode_integer(value, 8).unwrap();
            e.encode_absent();
        }
        e.encode_absent().encode_absent();
    });

    message(&mut encoder, 3, 0x0201, |e| {
        e.encode_list(1).encode_absent();
    });

    encoder.into_bytes()
}

/// Complete wire frame around [`meter_file`]
pub fn meter_frame(entries: &[Entry]) -> Vec<u8> {
    SmlFrame::encode(&meter_file(entries))
}
