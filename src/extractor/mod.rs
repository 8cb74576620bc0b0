//! Key assembly over the eight sub-blocks of one PUF response
//!
//! Enrollment encodes 4 packed response bytes per sub-block; reconstruction
//! decodes a 32-byte enrollment-record stride per sub-block. Segments are
//! concatenated in sub-block order to form the 128-bit key.

mod material;
mod source;

pub use material::{Enrollment, HelperData, Key, Reconstruction};
pub use source::{expand_response, Challenge, PufSource, RecordedPuf, RecordedPufError};

use tracing::{info, warn};
use zeroize::Zeroize;

use crate::code::constants::{
    BLOCKS, HELPER_BYTES_PER_BLOCK, HELPER_LEN, KEY_LEN, RECORD_LEN, RECORD_STRIDE,
    RESPONSE_BYTES_PER_BLOCK, RESPONSE_LEN, SEGMENT_BYTES,
};
use crate::code::{BchCode, BlockOutcome, BlockStatus};
use crate::FuzzyError;

/// Hook run between sub-blocks, e.g. to sleep and recharge on a
/// harvested-energy device
pub trait BlockPacer {
    /// Called after sub-block `completed` when more blocks follow
    fn between_blocks(&mut self, completed: usize);
}

impl<F: FnMut(usize)> BlockPacer for F {
    fn between_blocks(&mut self, completed: usize) {
        self(completed)
    }
}

/// Pacer that never pauses
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl BlockPacer for NoPacing {
    fn between_blocks(&mut self, _completed: usize) {}
}

/// Drives the block encoder/decoder over a full response
#[derive(Debug, Clone)]
pub struct KeyAssembler {
    code: BchCode,
}

impl KeyAssembler {
    /// Assembler over the device code with the hardcoded generator
    pub fn new() -> Result<Self, FuzzyError> {
        Ok(Self::with_code(BchCode::new()?))
    }

    /// Assembler over an explicit code
    pub fn with_code(code: BchCode) -> Self {
        Self { code }
    }

    /// Underlying code
    pub fn code(&self) -> &BchCode {
        &self.code
    }

    /// Enroll a packed response (at least 32 bytes)
    pub fn enroll(&self, response: &[u8]) -> Result<Enrollment, FuzzyError> {
        self.enroll_paced(response, &mut NoPacing)
    }

    /// `enroll`, calling `pacer` between sub-blocks
    pub fn enroll_paced<P: BlockPacer + ?Sized>(
        &self,
        response: &[u8],
        pacer: &mut P,
    ) -> Result<Enrollment, FuzzyError> {
        ensure_len(response, RESPONSE_LEN)?;
        let encoder = self.code.encoder();
        let mut helper = [0u8; HELPER_LEN];
        let mut key = [0u8; KEY_LEN];

        for block in 0..BLOCKS {
            let chunk = stride::<RESPONSE_BYTES_PER_BLOCK>(response, block)?;
            let encoded = encoder.encode(chunk);
            helper[block * HELPER_BYTES_PER_BLOCK..][..HELPER_BYTES_PER_BLOCK]
                .copy_from_slice(&encoded.helper);
            key[block * SEGMENT_BYTES..][..SEGMENT_BYTES].copy_from_slice(&encoded.segment);

            if block + 1 < BLOCKS {
                pacer.between_blocks(block);
            }
        }

        let enrollment = Enrollment::new(HelperData::from_bytes(helper), Key::from_bytes(key));
        key.zeroize();
        info!(fingerprint = %enrollment.key().fingerprint(), "enrolled PUF response");
        Ok(enrollment)
    }

    /// Enroll the response a source returns for `challenge`
    pub fn enroll_from<S: PufSource>(
        &self,
        source: &mut S,
        challenge: Challenge,
    ) -> Result<Enrollment, FuzzyError> {
        let mut response = source
            .response(challenge)
            .map_err(|e| FuzzyError::Source(Box::new(e)))?;
        let enrollment = self.enroll(&response);
        response.zeroize();
        enrollment
    }

    /// Rebuild the key from an enrollment record (at least 256 bytes) and
    /// 16 bytes of helper data
    pub fn reconstruct(&self, record: &[u8], helper: &[u8]) -> Result<Reconstruction, FuzzyError> {
        self.reconstruct_paced(record, helper, &mut NoPacing)
    }

    /// `reconstruct`, calling `pacer` between sub-blocks
    pub fn reconstruct_paced<P: BlockPacer + ?Sized>(
        &self,
        record: &[u8],
        helper: &[u8],
        pacer: &mut P,
    ) -> Result<Reconstruction, FuzzyError> {
        let helper = HelperData::try_from(helper)?;
        ensure_len(record, RECORD_LEN)?;

        let mut outcomes = self.decode_blocks(record, &helper, pacer)?;
        let mut key = [0u8; KEY_LEN];
        let mut statuses = [BlockStatus::Clean; BLOCKS];
        for (block, outcome) in outcomes.iter().enumerate() {
            key[block * SEGMENT_BYTES..][..SEGMENT_BYTES].copy_from_slice(&outcome.segment());
            statuses[block] = outcome.status();
        }
        outcomes.zeroize();

        let reconstruction = Reconstruction::new(Key::from_bytes(key), statuses);
        key.zeroize();

        if reconstruction.is_verified() {
            info!(
                total_errors = reconstruction.total_errors(),
                fingerprint = %reconstruction.key().fingerprint(),
                "reconstructed key"
            );
        } else {
            warn!(
                blocks = ?reconstruction.uncorrectable_blocks().collect::<Vec<_>>(),
                "key contains uncorrectable sub-blocks"
            );
        }
        Ok(reconstruction)
    }

    /// Rebuild the key from the enrollment record a source returns
    pub fn reconstruct_from<S: PufSource>(
        &self,
        source: &mut S,
        challenge: Challenge,
        helper: &[u8],
    ) -> Result<Reconstruction, FuzzyError> {
        let helper = HelperData::try_from(helper)?;
        let mut record = source
            .enrollment_record(challenge)
            .map_err(|e| FuzzyError::Source(Box::new(e)))?;
        let reconstruction = self.reconstruct(&record, helper.as_bytes());
        record.zeroize();
        reconstruction
    }

    /// Per-block decoder outcomes in sub-block order
    ///
    /// The assembled key is the concatenation of these segments.
    pub fn decode_blocks<P: BlockPacer + ?Sized>(
        &self,
        record: &[u8],
        helper: &HelperData,
        pacer: &mut P,
    ) -> Result<[BlockOutcome; BLOCKS], FuzzyError> {
        ensure_len(record, RECORD_LEN)?;
        let decoder = self.code.decoder();
        let mut outcomes = [BlockOutcome::Clean([0; SEGMENT_BYTES]); BLOCKS];

        for (block, (slot, helper)) in outcomes.iter_mut().zip(helper.blocks()).enumerate() {
            let stride = stride::<RECORD_STRIDE>(record, block)?;
            *slot = decoder.decode(stride, helper);
            if slot.is_uncorrectable() {
                warn!(block, "uncorrectable sub-block");
            }

            if block + 1 < BLOCKS {
                pacer.between_blocks(block);
            }
        }

        Ok(outcomes)
    }
}

fn ensure_len(bytes: &[u8], needed: usize) -> Result<(), FuzzyError> {
    if bytes.len() < needed {
        return Err(FuzzyError::ShortReading {
            needed,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// The `index`-th `N`-byte stride of `bytes`
fn stride<const N: usize>(bytes: &[u8], index: usize) -> Result<&[u8; N], FuzzyError> {
    bytes
        .get(index * N..(index + 1) * N)
        .and_then(|chunk| chunk.try_into().ok())
        .ok_or(FuzzyError::ShortReading {
            needed: (index + 1) * N,
            actual: bytes.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_inputs_fail_fast() {
        let assembler = KeyAssembler::new().unwrap();
        assert!(matches!(
            assembler.enroll(&[0u8; 31]),
            Err(FuzzyError::ShortReading { needed: 32, actual: 31 })
        ));
        assert!(matches!(
            assembler.reconstruct(&[0u8; 255], &[0u8; 16]),
            Err(FuzzyError::ShortReading { needed: 256, actual: 255 })
        ));
        // helper data is checked before the record
        assert!(matches!(
            assembler.reconstruct(&[0u8; 10], &[0u8; 15]),
            Err(FuzzyError::MalformedHelperData { .. })
        ));
    }

    #[test]
    fn test_pacer_runs_between_blocks() {
        let assembler = KeyAssembler::new().unwrap();
        let mut seen = Vec::new();
        let mut pacer = |block: usize| seen.push(block);
        assembler.enroll_paced(&[0x11; 32], &mut pacer).unwrap();
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_zero_response_round_trips() {
        let assembler = KeyAssembler::new().unwrap();
        let enrollment = assembler.enroll(&[0u8; 32]).unwrap();
        assert_eq!(enrollment.helper().as_bytes(), &[0u8; 16]);
        let rebuilt = assembler
            .reconstruct(&[0u8; 256], enrollment.helper().as_bytes())
            .unwrap();
        assert_eq!(rebuilt.statuses(), &[BlockStatus::Clean; BLOCKS]);
        assert_eq!(rebuilt.key(), enrollment.key());
    }
}
