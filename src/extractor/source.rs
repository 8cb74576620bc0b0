//! PUF sampling collaborator
//!
//! Two views of the same device response:
//! - packed response: 4 bytes per sub-block, consumed by enrollment
//! - enrollment record: one bit per byte, 32 bytes per sub-block,
//!   consumed by reconstruction

use std::collections::HashMap;

use thiserror::Error;

use crate::code::bits;
use crate::code::constants::{RECORD_LEN, RESPONSE_LEN};

/// Selects which PUF block the device samples
pub type Challenge = u8;

/// Source of noisy PUF readings
pub trait PufSource {
    /// Failure reported by the sampling hardware or its driver
    type Error: std::error::Error + Send + Sync + 'static;

    /// Packed response for `challenge`
    fn response(&mut self, challenge: Challenge) -> Result<[u8; RESPONSE_LEN], Self::Error>;

    /// Enrollment record for `challenge`, one bit per byte
    fn enrollment_record(&mut self, challenge: Challenge) -> Result<[u8; RECORD_LEN], Self::Error>;
}

/// Expand a packed response into the enrollment-record layout
///
/// Byte `8i + j` of the result is bit `7 - j` of `packed[i]`.
pub fn expand_response(packed: &[u8]) -> Vec<u8> {
    bits::expand_bits(packed)
}

/// Error returned by `RecordedPuf`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordedPufError {
    /// No response stored for this challenge
    #[error("no response recorded for challenge {0}")]
    UnknownChallenge(Challenge),
}

/// In-memory PUF replaying captured responses per challenge
#[derive(Debug, Clone, Default)]
pub struct RecordedPuf {
    responses: HashMap<Challenge, [u8; RESPONSE_LEN]>,
}

impl RecordedPuf {
    /// Empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a packed response for `challenge`, replacing any earlier one
    pub fn record(&mut self, challenge: Challenge, response: [u8; RESPONSE_LEN]) {
        self.responses.insert(challenge, response);
    }

    /// Builder-style `record`
    pub fn with_response(mut self, challenge: Challenge, response: [u8; RESPONSE_LEN]) -> Self {
        self.record(challenge, response);
        self
    }
}

impl PufSource for RecordedPuf {
    type Error = RecordedPufError;

    fn response(&mut self, challenge: Challenge) -> Result<[u8; RESPONSE_LEN], Self::Error> {
        self.responses
            .get(&challenge)
            .copied()
            .ok_or(RecordedPufError::UnknownChallenge(challenge))
    }

    fn enrollment_record(&mut self, challenge: Challenge) -> Result<[u8; RECORD_LEN], Self::Error> {
        let response = self.response(challenge)?;
        let mut record = [0u8; RECORD_LEN];
        record.copy_from_slice(&expand_response(&response));
        Ok(record)
    }
}
