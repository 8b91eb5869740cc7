//! SML frame encoding

use crate::framing::crc::Crc16;
use crate::framing::escape::{EscapeCode, ESCAPE_BYTE, ESCAPE_RUN, ESCAPE_SEQUENCE, START_SEQUENCE};

/// Payload and padding are aligned to this many bytes
const ALIGNMENT: usize = 4;

/// Wire frame builder
///
/// Produces `start sequence | escaped payload | padding | end sequence`, with
/// the checksum over everything before the last two bytes. Payloads should
/// end with `endOfSmlMsg` (0x00), as SML files always do; a payload ending
/// in 0x1B without padding would run into the end sequence.
pub struct SmlFrame;

impl SmlFrame {
    /// Encode a payload into a complete frame
    pub fn encode(payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(payload.len() + 2 * START_SEQUENCE.len() + ALIGNMENT);
        frame.extend_from_slice(&START_SEQUENCE);
        Self::escape_into(payload, &mut frame);

        let padding = (ALIGNMENT - frame.len() % ALIGNMENT) % ALIGNMENT;
        frame.resize(frame.len() + padding, 0x00);

        frame.extend_from_slice(&ESCAPE_SEQUENCE);
        let mut crc = Crc16::new();
        crc.update_bytes(&frame);
        crc.update_bytes(&EscapeCode::end_code(padding as u8, 0)[..2]);
        frame.extend_from_slice(&EscapeCode::end_code(padding as u8, crc.value()));
        frame
    }

    /// Copy `payload`, doubling every run of four escape bytes
    pub fn escape_into(payload: &[u8], out: &mut Vec<u8>) {
        let mut run = 0;
        for &byte in payload {
            out.push(byte);
            if byte != ESCAPE_BYTE {
                run = 0;
                continue;
            }
            run += 1;
            if run == ESCAPE_RUN {
                out.extend_from_slice(&ESCAPE_SEQUENCE);
                run = 0;
            }
        }
    }
}
