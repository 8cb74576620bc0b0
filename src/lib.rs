//! # PUF key derivation with a BCH(31,16,3) fuzzy extractor
//!
//! A Physically Unclonable Function yields a device-unique bit pattern that
//! flips a few bits on every reading. This crate turns such a reading into a
//! stable 128-bit key:
//!
//! 1. **Enrollment**: each 32-bit sub-block of a response is BCH-encoded; the
//!    15 parity bits (masked with more response bits) become public helper
//!    data, the first 16 bits become a key segment.
//! 2. **Reconstruction**: a fresh reading plus the stored helper data forms a
//!    noisy codeword; Berlekamp–Massey and Chien search correct up to three
//!    bit errors per sub-block and recover the enrolled key segment.
//!
//! ## Usage Example
//!
//! ```
//! use secucode_puf::{expand_response, KeyAssembler};
//!
//! let assembler = KeyAssembler::new()?;
//! let response = [0x5Au8; 32];
//! let enrollment = assembler.enroll(&response)?;
//!
//! let record = expand_response(&response);
//! let rebuilt = assembler.reconstruct(&record, enrollment.helper().as_bytes())?;
//! assert_eq!(rebuilt.key(), enrollment.key());
//! assert_eq!(rebuilt.total_errors(), 0);
//! # Ok::<(), secucode_puf::FuzzyError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod algebra;   // GF(2^m) tables and generator synthesis
pub mod code;      // BCH block encoder/decoder for the (31,16,3) code
pub mod extractor; // Key assembly over eight sub-blocks
pub mod ffi;       // C ABI for native consumers

pub use algebra::{CyclotomicCosets, GaloisField, GeneratorPolynomial, LogForm, PolyForm};
pub use code::{BchCode, BlockDecoder, BlockEncoder, BlockOutcome, BlockStatus, EncodedBlock};
pub use extractor::{
    expand_response, BlockPacer, Challenge, Enrollment, HelperData, Key, KeyAssembler, NoPacing,
    PufSource, Reconstruction, RecordedPuf,
};

use thiserror::Error;

/// Errors raised while configuring the code or deriving keys
#[derive(Error, Debug)]
pub enum FuzzyError {
    /// Field degree outside the supported table sizes
    #[error("field degree {degree} outside supported range 2..={max}")]
    UnsupportedFieldDegree {
        /// Requested degree m
        degree: u32,
        /// Largest supported degree
        max: u32,
    },

    /// Polynomial does not generate every nonzero element of the field
    #[error("polynomial {poly:#b} is not primitive for GF(2^{degree})")]
    NotPrimitive {
        /// Polynomial bit pattern (bit i = coefficient of x^i)
        poly: u32,
        /// Requested degree m
        degree: u32,
    },

    /// Code length does not fit the field
    #[error("code length {length} invalid for GF(2^{degree}) (need {min}..={max})")]
    InvalidCodeLength {
        /// Requested length
        length: usize,
        /// Field degree m
        degree: u32,
        /// Smallest accepted length
        min: usize,
        /// Largest accepted length (2^m - 1)
        max: usize,
    },

    /// Requested correction capability leaves no information bits
    #[error("infeasible code parameters: length {length} with t = {capability} needs {redundancy} parity bits")]
    InfeasibleCodeParameters {
        /// Code length
        length: usize,
        /// Error-correcting capability t
        capability: usize,
        /// Number of parity bits the generator would need
        redundancy: usize,
    },

    /// Field or generator does not match the fixed block geometry
    #[error("incompatible code: {0}")]
    IncompatibleCode(String),

    /// Helper data has the wrong size
    #[error("helper data must be {expected} bytes, got {actual}")]
    MalformedHelperData {
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// PUF reading does not cover all sub-blocks
    #[error("PUF reading too short: need {needed} bytes, got {actual}")]
    ShortReading {
        /// Bytes required for all sub-blocks
        needed: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Sub-block could not be corrected; its key segment is unverified
    #[error("sub-block {block} has more errors than the code can correct")]
    UncorrectableBlock {
        /// Index of the first failing sub-block
        block: usize,
    },

    /// PUF collaborator failed to produce a reading
    #[error("PUF source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}
