#![allow(dead_code)]

use secucode_puf::{expand_response, KeyAssembler};

/// Packed device response whose enrollment yields `GOLDEN_HELPER`
pub const GOLDEN_RESPONSE: [u8; 32] = [
    0x53, 0x65, 0xEF, 0xB4, 0x63, 0x75, 0xA9, 0x78, 0x43, 0x6F, 0xBC, 0x10, 0x64, 0x65, 0xD0,
    0x92, 0x20, 0x50, 0x8D, 0x36, 0x55, 0x46, 0x3A, 0xD0, 0x20, 0x6B, 0xE9, 0x0E, 0x65, 0x79,
    0x63, 0xBE,
];

/// Helper data stored on the device for `GOLDEN_RESPONSE`
pub const GOLDEN_HELPER: [u8; 16] = [
    0x3A, 0x32, 0x55, 0xEE, 0xBB, 0x96, 0xB2, 0xF2, 0x91, 0xD0, 0x14, 0x32, 0xCD, 0xC2, 0x2E,
    0xF8,
];

/// Key enrolled from `GOLDEN_RESPONSE`
pub const GOLDEN_KEY: &[u8; 16] = b"SecuCode PUF key";

/// Enrollment record for `GOLDEN_RESPONSE`, one bit per byte
pub fn golden_record() -> Vec<u8> {
    expand_response(&GOLDEN_RESPONSE)
}

/// Flip record bits; `positions` index the 32-byte stride of `block`
pub fn flip(record: &mut [u8], block: usize, positions: &[usize]) {
    for &position in positions {
        record[block * 32 + position] ^= 1;
    }
}

pub fn assembler() -> KeyAssembler {
    KeyAssembler::new().expect("device code builds")
}
