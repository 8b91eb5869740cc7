//! CRC16 calculation for SML frames (CRC-16/X-25)

/// CRC calculation constants
const INITIAL_CRC: u16 = 0xFFFF;
const FINAL_XOR: u16 = 0xFFFF;
const KEY: u16 = 0x8408; // Bit-reversed 1021

/// Build the 256-entry lookup table for the reflected polynomial
pub fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    for (b, entry) in table.iter_mut().enumerate() {
        let mut v = b as u16;
        for _ in 0..8 {
            v = if v & 1 == 1 { (v >> 1) ^ KEY } else { v >> 1 };
        }
        *entry = v;
    }
    table
}

/// Precomputed CRC table
static CRC_TABLE: once_cell::sync::Lazy<[u16; 256]> = once_cell::sync::Lazy::new(build_table);

/// Table-driven CRC16 of `data`
pub fn crc16(data: &[u8]) -> u16 {
    let mut calc = Crc16::new();
    calc.update_bytes(data);
    calc.value()
}

/// Bit-by-bit CRC16 of `data`, the reference for [`crc16`]
pub fn crc16_bitwise(data: &[u8]) -> u16 {
    let mut acc = INITIAL_CRC;
    for &byte in data {
        acc ^= u16::from(byte);
        for _ in 0..8 {
            acc = if acc & 1 == 1 { (acc >> 1) ^ KEY } else { acc >> 1 };
        }
    }
    acc ^ FINAL_XOR
}

/// Incremental CRC16 calculator
#[derive(Debug, Clone)]
pub struct Crc16 {
    acc: u16,
}

impl Crc16 {
    pub fn new() -> Self {
        Self { acc: INITIAL_CRC }
    }

    /// Reset to the initial state
    pub fn reset(&mut self) {
        self.acc = INITIAL_CRC;
    }

    /// Update with a single byte
    pub fn update(&mut self, data: u8) {
        let index = (data ^ (self.acc as u8)) as usize;
        self.acc = CRC_TABLE[index] ^ (self.acc >> 8);
    }

    /// Update with multiple bytes
    pub fn update_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.update(byte);
        }
    }

    /// Get the CRC of everything fed so far
    pub fn value(&self) -> u16 {
        self.acc ^ FINAL_XOR
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}
