//! BCH generator polynomial synthesis
//!
//! g(x) is the product of (x + alpha^z) over every z in the cyclotomic
//! cosets that contain one of 1..d-1, where d = 2t + 1 is the designed
//! distance. Conjugate roots make every coefficient 0 or 1.

use super::{GaloisField, PolyForm};
use crate::FuzzyError;

/// Orbits {i, 2i, 4i, ...} mod n, excluding the trivial coset {0}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclotomicCosets {
    modulus: usize,
    cosets: Vec<Vec<usize>>,
}

impl CyclotomicCosets {
    /// Enumerate cosets mod `n`, representatives in increasing order
    pub fn modulo(modulus: usize) -> Self {
        let mut covered = vec![false; modulus];
        let mut cosets = Vec::new();

        for representative in 1..modulus {
            if covered[representative] {
                continue;
            }
            let mut coset = vec![representative];
            covered[representative] = true;
            let mut next = (representative * 2) % modulus;
            while !covered[next] {
                covered[next] = true;
                coset.push(next);
                next = (next * 2) % modulus;
            }
            cosets.push(coset);
        }

        Self { modulus, cosets }
    }

    /// Modulus n
    pub fn modulus(&self) -> usize {
        self.modulus
    }

    /// Number of nontrivial cosets
    pub fn len(&self) -> usize {
        self.cosets.len()
    }

    /// True when n <= 1
    pub fn is_empty(&self) -> bool {
        self.cosets.is_empty()
    }

    /// Iterate over cosets, each listed in doubling order
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.cosets.iter().map(Vec::as_slice)
    }
}

/// Binary generator polynomial of a BCH code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorPolynomial {
    /// g[0] is the constant term, g[redundancy] the leading 1
    coefficients: Vec<u8>,
    /// Exponents z of the roots alpha^z
    zeros: Vec<usize>,
    length: usize,
    capability: usize,
}

impl GeneratorPolynomial {
    /// Synthesize g(x) for a code of `length` correcting `capability` errors
    ///
    /// Accepts lengths in `2^(m-1)..=2^m - 1`. Fails with
    /// `InfeasibleCodeParameters` when the roots leave no information bits.
    pub fn synthesize(
        field: &GaloisField,
        length: usize,
        capability: usize,
    ) -> Result<Self, FuzzyError> {
        let n = field.order();
        let min_length = 1usize << (field.degree() - 1);
        if !(min_length..=n).contains(&length) {
            return Err(FuzzyError::InvalidCodeLength {
                length,
                degree: field.degree(),
                min: min_length,
                max: n,
            });
        }
        if capability == 0 {
            return Err(FuzzyError::InfeasibleCodeParameters {
                length,
                capability,
                redundancy: 0,
            });
        }

        let designed_distance = 2 * capability + 1;
        let zeros: Vec<usize> = CyclotomicCosets::modulo(n)
            .iter()
            .filter(|coset| coset.iter().any(|&z| z < designed_distance))
            .flat_map(|coset| coset.iter().copied())
            .collect();

        let redundancy = zeros.len();
        if redundancy >= length {
            return Err(FuzzyError::InfeasibleCodeParameters {
                length,
                capability,
                redundancy,
            });
        }

        // Multiply in one linear factor at a time, highest coefficient first
        let mut g = vec![PolyForm::ZERO; redundancy + 1];
        g[0] = PolyForm::ONE;
        for (degree, &zero) in zeros.iter().enumerate() {
            let root = field.alpha_pow(zero);
            for i in (1..=degree + 1).rev() {
                g[i] = g[i - 1] ^ field.mul(g[i], root);
            }
            g[0] = field.mul(g[0], root);
        }

        let coefficients = g
            .iter()
            .map(|c| {
                debug_assert!(c.bits() <= 1, "conjugate roots give binary coefficients");
                u8::from(*c == PolyForm::ONE)
            })
            .collect();

        Ok(Self {
            coefficients,
            zeros,
            length,
            capability,
        })
    }

    /// Coefficients g[0..=redundancy], constant term first
    pub fn coefficients(&self) -> &[u8] {
        &self.coefficients
    }

    /// Root exponents, grouped by coset
    pub fn zeros(&self) -> &[usize] {
        &self.zeros
    }

    /// Degree of g(x), the number of parity bits
    pub fn redundancy(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Information bits per codeword, k = length - redundancy
    pub fn dimension(&self) -> usize {
        self.length - self.redundancy()
    }

    /// Codeword length
    pub fn length(&self) -> usize {
        self.length
    }

    /// Error-correcting capability t
    pub fn capability(&self) -> usize {
        self.capability
    }

    /// Designed minimum distance d = 2t + 1
    pub fn designed_distance(&self) -> usize {
        2 * self.capability + 1
    }
}
