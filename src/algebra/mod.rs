//! Finite-field algebra for binary BCH codes
//!
//! - GF(2^m) log/antilog tables with typed element representations
//! - Cyclotomic cosets and generator polynomial synthesis
//!
//! Tables are built once and only read afterwards, so a field can be shared
//! across threads by reference.

mod field;
mod polynomial;

pub use field::{GaloisField, LogForm, PolyForm, MAX_FIELD_DEGREE};
pub use polynomial::{CyclotomicCosets, GeneratorPolynomial};
