//! SML transport framing
//!
//! A frame on the wire looks like this:
//!
//! ```text
//! 1B 1B 1B 1B 01 01 01 01 | payload ... | 00 padding | 1B 1B 1B 1B 1A pp c1 c2
//! ```
//!
//! The CRC covers everything up to and including `1A pp`.

pub mod crc;
pub mod escape;
pub mod frame;
pub mod parser;
pub mod settings;
pub mod sink;
pub mod state;
pub mod statistics;

pub use crc::{crc16, crc16_bitwise, Crc16};
pub use escape::{EscapeCode, ESCAPE_BYTE, ESCAPE_SEQUENCE, START_SEQUENCE};
pub use frame::SmlFrame;
pub use parser::SmlParser;
pub use settings::ParserSettings;
pub use sink::EventSink;
pub use state::ScanState;
pub use statistics::SmlStatistics;
