//! BCH decoding of one sub-block: syndromes, Berlekamp–Massey, Chien search
//!
//! The received word is rebuilt from stored helper data and a fresh
//! enrollment record:
//!
//! ```text
//! recd[0..15]  = helper parity bits ^ record[16..31]   (unmasked parity)
//! recd[15..31] = record[0..16]                         (noisy key bits)
//! ```
//!
//! Every scratch table is a stack array sized from the code constants and
//! zero-initialised per call.

use tracing::{debug, trace, warn};
use zeroize::Zeroize;

use super::bits;
use super::constants::{
    CAPABILITY, DIMENSION, HELPER_BYTES_PER_BLOCK, LENGTH, RECORD_STRIDE, REDUNDANCY,
    SEGMENT_BYTES, SYNDROMES,
};
use crate::algebra::{GaloisField, LogForm, PolyForm};
use crate::FuzzyError;

/// Per-block decode result, without key material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockStatus {
    /// All syndromes zero: verified without correction
    Clean,
    /// This many bit errors were located and flipped
    Corrected(usize),
    /// Locator degree above t or roots missing: segment is unverified
    Uncorrectable,
}

impl BlockStatus {
    /// Corrected bits, `None` when the block could not be verified
    pub fn corrected_errors(self) -> Option<usize> {
        match self {
            Self::Clean => Some(0),
            Self::Corrected(count) => Some(count),
            Self::Uncorrectable => None,
        }
    }
}

/// Key segment together with how it was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// No errors detected
    Clean([u8; SEGMENT_BYTES]),
    /// Errors corrected
    Corrected {
        /// Corrected key segment
        segment: [u8; SEGMENT_BYTES],
        /// Number of flipped codeword bits
        errors: usize,
    },
    /// Raw, uncorrected key bits
    Uncorrectable([u8; SEGMENT_BYTES]),
}

impl BlockOutcome {
    /// Key segment, corrected where possible
    pub fn segment(&self) -> [u8; SEGMENT_BYTES] {
        match *self {
            Self::Clean(segment)
            | Self::Corrected { segment, .. }
            | Self::Uncorrectable(segment) => segment,
        }
    }

    /// Status without the key segment
    pub fn status(&self) -> BlockStatus {
        match *self {
            Self::Clean(_) => BlockStatus::Clean,
            Self::Corrected { errors, .. } => BlockStatus::Corrected(errors),
            Self::Uncorrectable(_) => BlockStatus::Uncorrectable,
        }
    }

    /// True when the segment could not be verified
    pub fn is_uncorrectable(&self) -> bool {
        matches!(self, Self::Uncorrectable(_))
    }
}

impl Zeroize for BlockOutcome {
    fn zeroize(&mut self) {
        match self {
            Self::Clean(segment) | Self::Uncorrectable(segment) => segment.zeroize(),
            Self::Corrected { segment, errors } => {
                segment.zeroize();
                errors.zeroize();
            }
        }
    }
}

/// Syndromes S_1..S_2t in log form; index 0 is unused
type Syndromes = [Option<LogForm>; SYNDROMES + 1];

/// Error-locator polynomial sigma(x), coefficient i at index i
#[derive(Debug, Clone, Copy)]
struct Locator {
    coefficients: [PolyForm; SYNDROMES + 1],
    degree: usize,
}

/// Berlekamp decoder for the (31,16,3) code
#[derive(Debug, Clone, Copy)]
pub struct BlockDecoder<'a> {
    field: &'a GaloisField,
}

impl<'a> BlockDecoder<'a> {
    /// Decoder over GF(2^5); the field order must equal the code length
    pub fn new(field: &'a GaloisField) -> Result<Self, FuzzyError> {
        if field.order() != LENGTH {
            return Err(FuzzyError::IncompatibleCode(format!(
                "decoder needs a field of order {LENGTH}, got {}",
                field.order()
            )));
        }
        Ok(Self::for_checked_field(field))
    }

    /// Caller has already checked the field order
    pub(crate) fn for_checked_field(field: &'a GaloisField) -> Self {
        Self { field }
    }

    /// Decode one sub-block from its record bytes and helper bytes
    pub fn decode(
        &self,
        record: &[u8; RECORD_STRIDE],
        helper: [u8; HELPER_BYTES_PER_BLOCK],
    ) -> BlockOutcome {
        let mut recd = received_word(record, helper);
        let outcome = self.decode_word(&mut recd);
        recd.zeroize();
        outcome
    }

    /// Correct a received word in place and extract its information bits
    pub fn decode_word(&self, recd: &mut [u8; LENGTH]) -> BlockOutcome {
        let syndromes = match self.syndromes(recd) {
            Some(syndromes) => syndromes,
            None => return BlockOutcome::Clean(information_bits(recd)),
        };
        debug!(syndromes = ?syndromes.map(|s| s.map(LogForm::exponent)), "nonzero syndromes");

        let locator = self.error_locator(&syndromes);
        if locator.degree > CAPABILITY {
            warn!(degree = locator.degree, "error locator degree exceeds t");
            return BlockOutcome::Uncorrectable(information_bits(recd));
        }

        match self.chien_search(&locator) {
            Some((positions, count)) => {
                for &position in &positions[..count] {
                    recd[position] ^= 1;
                }
                debug!(errors = count, "sub-block corrected");
                BlockOutcome::Corrected {
                    segment: information_bits(recd),
                    errors: count,
                }
            }
            None => {
                warn!(degree = locator.degree, "root count does not match locator degree");
                BlockOutcome::Uncorrectable(information_bits(recd))
            }
        }
    }

    /// S_i = r(alpha^i) for i in 1..=2t, `None` when every syndrome is zero
    fn syndromes(&self, recd: &[u8; LENGTH]) -> Option<Syndromes> {
        let mut syndromes: Syndromes = [None; SYNDROMES + 1];
        let mut any_error = false;

        for (i, slot) in syndromes.iter_mut().enumerate().skip(1) {
            let value = recd
                .iter()
                .enumerate()
                .filter(|(_, &bit)| bit != 0)
                .fold(PolyForm::ZERO, |acc, (j, _)| {
                    acc ^ self.field.alpha_pow(i * j)
                });
            any_error |= !value.is_zero();
            *slot = self.field.log(value);
        }

        any_error.then_some(syndromes)
    }

    /// Berlekamp's iterative algorithm in the tabular form of Lin and Costello
    ///
    /// Row `u` holds sigma at step u - 1; `disc[u]` is that step's
    /// discrepancy, `gap[u]` the difference between step and degree.
    fn error_locator(&self, syndromes: &Syndromes) -> Locator {
        let field = self.field;
        let mut elp = [[PolyForm::ZERO; SYNDROMES + 1]; SYNDROMES + 2];
        let mut disc: [Option<LogForm>; SYNDROMES + 2] = [None; SYNDROMES + 2];
        let mut degree = [0usize; SYNDROMES + 2];
        let mut gap = [0isize; SYNDROMES + 2];

        disc[0] = Some(LogForm::ZERO);
        disc[1] = syndromes[1];
        elp[0][0] = PolyForm::ONE;
        elp[1][0] = PolyForm::ONE;
        gap[0] = -1;

        let mut u = 0;
        loop {
            u += 1;
            match disc[u] {
                None => {
                    degree[u + 1] = degree[u];
                    elp[u + 1] = elp[u];
                }
                Some(du) => {
                    // Latest earlier step with a nonzero discrepancy...
                    // (disc[0] is alpha^0, so the search always lands)
                    let (mut q, mut dq) = (0..u)
                        .rev()
                        .find_map(|j| disc[j].map(|d| (j, d)))
                        .unwrap_or((0, LogForm::ZERO));
                    // ...then the one with the largest step/degree gap
                    for j in (0..q).rev() {
                        if let Some(dj) = disc[j] {
                            if gap[q] < gap[j] {
                                q = j;
                                dq = dj;
                            }
                        }
                    }

                    degree[u + 1] = degree[u].max(degree[q] + u - q);

                    // sigma_{u+1} = sigma_u + (d_u / d_q) x^(u-q) sigma_q
                    let scale = field.log_div(du, dq);
                    let mut next = [PolyForm::ZERO; SYNDROMES + 1];
                    for i in 0..=degree[q] {
                        if let Some(coefficient) = field.log(elp[q][i]) {
                            next[i + u - q] = field.exp(field.log_mul(scale, coefficient));
                        }
                    }
                    for i in 0..=degree[u] {
                        next[i] ^= elp[u][i];
                    }
                    elp[u + 1] = next;
                }
            }
            gap[u + 1] = u as isize - degree[u + 1] as isize;

            if u >= SYNDROMES || degree[u + 1] > CAPABILITY {
                break;
            }

            // d_{u+1} = S_{u+1} + sum sigma_i S_{u+1-i}
            let mut next_disc = syndromes[u + 1].map_or(PolyForm::ZERO, |s| field.exp(s));
            for i in 1..=degree[u + 1] {
                if let (Some(s), Some(coefficient)) =
                    (syndromes[u + 1 - i], field.log(elp[u + 1][i]))
                {
                    next_disc ^= field.exp(field.log_mul(s, coefficient));
                }
            }
            disc[u + 1] = field.log(next_disc);
        }
        u += 1;

        Locator {
            coefficients: elp[u],
            degree: degree[u],
        }
    }

    /// Roots of sigma among alpha^-1..alpha^-n; error at position n - i
    ///
    /// Returns the positions only when their count equals the locator degree.
    fn chien_search(&self, locator: &Locator) -> Option<([usize; CAPABILITY], usize)> {
        let field = self.field;
        let n = field.order();
        if locator.degree == 0 {
            return None;
        }

        let mut reg: [Option<LogForm>; CAPABILITY + 1] = [None; CAPABILITY + 1];
        for (j, slot) in reg.iter_mut().enumerate().take(locator.degree + 1).skip(1) {
            *slot = field.log(locator.coefficients[j]);
        }

        let mut positions = [0usize; CAPABILITY];
        let mut count = 0;
        for i in 1..=n {
            let mut sum = PolyForm::ONE;
            for (j, slot) in reg.iter_mut().enumerate().take(locator.degree + 1).skip(1) {
                if let Some(r) = slot {
                    *r = field.log_shift(*r, j);
                    sum ^= field.exp(*r);
                }
            }
            if sum.is_zero() {
                let position = n - i;
                trace!(position, "locator root");
                if position >= LENGTH {
                    return None;
                }
                if count < CAPABILITY {
                    positions[count] = position;
                }
                count += 1;
            }
        }

        (count == locator.degree).then_some((positions, count))
    }
}

/// Build recd[] from the helper bytes and one enrollment-record stride
fn received_word(
    record: &[u8; RECORD_STRIDE],
    helper: [u8; HELPER_BYTES_PER_BLOCK],
) -> [u8; LENGTH] {
    let parity = bits::unpack_helper(helper);
    let mut recd = [0u8; LENGTH];
    for i in 0..REDUNDANCY {
        recd[i] = parity[i] ^ u8::from(record[DIMENSION + i] != 0);
    }
    for i in 0..DIMENSION {
        recd[REDUNDANCY + i] = u8::from(record[i] != 0);
    }
    recd
}

fn information_bits(recd: &[u8; LENGTH]) -> [u8; SEGMENT_BYTES] {
    let mut information = [0u8; DIMENSION];
    information.copy_from_slice(&recd[REDUNDANCY..]);
    let segment = bits::pack_segment(&information);
    information.zeroize();
    segment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::constants::{FIELD_DEGREE, PRIMITIVE_POLY};
    use crate::code::BlockEncoder;

    fn field() -> GaloisField {
        GaloisField::build(PRIMITIVE_POLY, FIELD_DEGREE).unwrap()
    }

    fn codeword(information: [u8; 2]) -> [u8; LENGTH] {
        let data: [u8; LENGTH] = bits::unpack(&information);
        let parity = BlockEncoder::default().parity(&data);
        let mut word = [0u8; LENGTH];
        word[..REDUNDANCY].copy_from_slice(&parity);
        word[REDUNDANCY..].copy_from_slice(&data[..DIMENSION]);
        word
    }

    #[test]
    fn test_codeword_has_zero_syndromes() {
        let field = field();
        let decoder = BlockDecoder::new(&field).unwrap();
        let word = codeword([0xA5, 0x3C]);
        assert!(decoder.syndromes(&word).is_none());
    }

    #[test]
    fn test_single_error_locator() {
        let field = field();
        let decoder = BlockDecoder::new(&field).unwrap();
        let mut word = codeword([0x12, 0x34]);
        word[7] ^= 1;
        let syndromes = decoder.syndromes(&word).expect("error is visible");
        // S_1 = alpha^7 for a single error at position 7
        assert_eq!(syndromes[1].map(LogForm::exponent), Some(7));
        let locator = decoder.error_locator(&syndromes);
        assert_eq!(locator.degree, 1);
        let (positions, count) = decoder.chien_search(&locator).unwrap();
        assert_eq!(&positions[..count], &[7]);
    }

    #[test]
    fn test_corrects_three_errors_anywhere() {
        let field = field();
        let decoder = BlockDecoder::new(&field).unwrap();
        for (a, b, c) in [(0, 1, 2), (0, 15, 30), (14, 15, 16), (28, 29, 30), (3, 17, 22)] {
            let mut word = codeword([0x53, 0x65]);
            word[a] ^= 1;
            word[b] ^= 1;
            word[c] ^= 1;
            let outcome = decoder.decode_word(&mut word);
            assert_eq!(
                outcome,
                BlockOutcome::Corrected { segment: [0x53, 0x65], errors: 3 },
                "errors at {a}, {b}, {c}"
            );
            assert_eq!(word, codeword([0x53, 0x65]));
        }
    }

    #[test]
    fn test_rejects_field_of_wrong_order() {
        let gf64 = GaloisField::build(0b100_0011, 6).unwrap();
        assert!(matches!(
            BlockDecoder::new(&gf64),
            Err(FuzzyError::IncompatibleCode(_))
        ));
    }

    #[test]
    fn test_outcome_zeroize_clears_segment() {
        let mut outcomes = [
            BlockOutcome::Clean([0x53, 0x65]),
            BlockOutcome::Corrected { segment: [0xAB, 0xCD], errors: 2 },
            BlockOutcome::Uncorrectable([0xFF, 0x01]),
        ];
        outcomes.zeroize();
        assert_eq!(
            outcomes,
            [
                BlockOutcome::Clean([0, 0]),
                BlockOutcome::Corrected { segment: [0, 0], errors: 0 },
                BlockOutcome::Uncorrectable([0, 0]),
            ]
        );
    }

    #[test]
    fn test_status_counts() {
        assert_eq!(BlockStatus::Clean.corrected_errors(), Some(0));
        assert_eq!(BlockStatus::Corrected(2).corrected_errors(), Some(2));
        assert_eq!(BlockStatus::Uncorrectable.corrected_errors(), None);
        let outcome = BlockOutcome::Uncorrectable([1, 2]);
        assert!(outcome.is_uncorrectable());
        assert_eq!(outcome.segment(), [1, 2]);
        assert_eq!(outcome.status(), BlockStatus::Uncorrectable);
    }
}
