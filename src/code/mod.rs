//! BCH(31,16,3) block code used by the fuzzy extractor
//!
//! `BchCode` bundles the GF(2^5) tables with the generator polynomial and
//! hands out block encoders and decoders that borrow them.

pub mod bits;
pub mod constants;
mod decoder;
mod encoder;

pub use decoder::{BlockDecoder, BlockOutcome, BlockStatus};
pub use encoder::{BlockEncoder, EncodedBlock};

use tracing::debug;

use crate::algebra::{GaloisField, GeneratorPolynomial};
use crate::FuzzyError;
use constants::{CAPABILITY, DIMENSION, FIELD_DEGREE, FIELD_ORDER, GENERATOR, LENGTH, PRIMITIVE_POLY, REDUNDANCY};

/// Field tables plus generator for the device code
///
/// Immutable after construction; share it by reference.
#[derive(Debug, Clone)]
pub struct BchCode {
    field: GaloisField,
    generator: [u8; REDUNDANCY + 1],
}

impl BchCode {
    /// Device code with the hardcoded generator (no synthesis at runtime)
    pub fn new() -> Result<Self, FuzzyError> {
        let field = GaloisField::build(PRIMITIVE_POLY, FIELD_DEGREE)?;
        Ok(Self {
            field,
            generator: GENERATOR,
        })
    }

    /// Device code with the generator synthesized from cyclotomic cosets
    pub fn synthesized() -> Result<Self, FuzzyError> {
        let field = GaloisField::build(PRIMITIVE_POLY, FIELD_DEGREE)?;
        let generator = GeneratorPolynomial::synthesize(&field, LENGTH, CAPABILITY)?;
        Self::from_parts(field, &generator)
    }

    /// Combine a field and a generator, checking the (31,16) block geometry
    pub fn from_parts(
        field: GaloisField,
        generator: &GeneratorPolynomial,
    ) -> Result<Self, FuzzyError> {
        if field.order() != FIELD_ORDER {
            return Err(FuzzyError::IncompatibleCode(format!(
                "field order {} but blocks need {}",
                field.order(),
                FIELD_ORDER
            )));
        }
        if generator.length() != LENGTH || generator.dimension() != DIMENSION {
            return Err(FuzzyError::IncompatibleCode(format!(
                "generator describes a ({}, {}) code, blocks need ({}, {})",
                generator.length(),
                generator.dimension(),
                LENGTH,
                DIMENSION
            )));
        }
        if generator.capability() < CAPABILITY {
            return Err(FuzzyError::IncompatibleCode(format!(
                "generator corrects {} errors, decoder assumes {}",
                generator.capability(),
                CAPABILITY
            )));
        }

        let mut coefficients = [0u8; REDUNDANCY + 1];
        coefficients.copy_from_slice(generator.coefficients());
        if coefficients != GENERATOR {
            debug!(?coefficients, "synthesized generator differs from device constant");
        }

        Ok(Self {
            field,
            generator: coefficients,
        })
    }

    /// GF(2^5) tables
    pub fn field(&self) -> &GaloisField {
        &self.field
    }

    /// Generator coefficients, constant term first
    pub fn generator(&self) -> &[u8; REDUNDANCY + 1] {
        &self.generator
    }

    /// Encoder using this code's generator
    pub fn encoder(&self) -> BlockEncoder {
        BlockEncoder::new(self.generator)
    }

    /// Decoder borrowing this code's field tables
    pub fn decoder(&self) -> BlockDecoder<'_> {
        BlockDecoder::for_checked_field(&self.field)
    }
}
