//! Field constants of the device code
//!
//! BCH(31,16) over GF(2^5) correcting t = 3 errors. The generator is
//! hardcoded so constrained callers can skip synthesis; `BchCode::synthesized`
//! rebuilds it from the field and checks it against this table.

/// Field degree m
pub const FIELD_DEGREE: u32 = 5;

/// x^5 + x^2 + 1, coefficient i in bit i
pub const PRIMITIVE_POLY: u32 = 0b10_0101;

/// Multiplicative group order n = 2^m - 1
pub const FIELD_ORDER: usize = (1 << FIELD_DEGREE) - 1;

/// Codeword length in bits
pub const LENGTH: usize = 31;

/// Information bits per codeword (k)
pub const DIMENSION: usize = 16;

/// Parity bits per codeword
pub const REDUNDANCY: usize = LENGTH - DIMENSION;

/// Error-correcting capability t
pub const CAPABILITY: usize = 3;

/// Number of syndromes evaluated while decoding (2t)
pub const SYNDROMES: usize = 2 * CAPABILITY;

/// Generator coefficients, constant term first
pub const GENERATOR: [u8; REDUNDANCY + 1] = [1, 1, 1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 0, 0, 0, 1];

/// Sub-blocks per key
pub const BLOCKS: usize = 8;

/// Packed response bytes consumed per sub-block at enrollment
pub const RESPONSE_BYTES_PER_BLOCK: usize = 4;

/// Enrollment-record bytes per sub-block (one bit per byte)
pub const RECORD_STRIDE: usize = 2 * DIMENSION;

/// Helper bytes per sub-block (15 parity bits + 1 zero padding bit)
pub const HELPER_BYTES_PER_BLOCK: usize = 2;

/// Key bytes per sub-block
pub const SEGMENT_BYTES: usize = DIMENSION / 8;

/// Packed PUF response length
pub const RESPONSE_LEN: usize = BLOCKS * RESPONSE_BYTES_PER_BLOCK;

/// Enrollment record length
pub const RECORD_LEN: usize = BLOCKS * RECORD_STRIDE;

/// Persisted helper data length
pub const HELPER_LEN: usize = BLOCKS * HELPER_BYTES_PER_BLOCK;

/// Derived key length
pub const KEY_LEN: usize = BLOCKS * SEGMENT_BYTES;
