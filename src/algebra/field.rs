//! Binary extension field GF(2^m)
//!
//! Elements live in two representations:
//! - `PolyForm`: the element as a bit vector of polynomial coefficients
//! - `LogForm`: the discrete logarithm i such that alpha^i = element
//!
//! Zero has no logarithm, so `log` returns `Option<LogForm>`.

use std::ops::{BitXor, BitXorAssign};

use crate::FuzzyError;

/// Largest supported degree m (tables hold 2^m entries)
pub const MAX_FIELD_DEGREE: u32 = 16;

/// Field element in polynomial representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PolyForm(u16);

impl PolyForm {
    /// Additive identity
    pub const ZERO: Self = Self(0);
    /// Multiplicative identity (alpha^0)
    pub const ONE: Self = Self(1);

    /// Wrap a raw coefficient bit pattern
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw coefficient bit pattern
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True for the additive identity
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl BitXor for PolyForm {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for PolyForm {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

/// Discrete logarithm of a nonzero element, in `0..n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogForm(u16);

impl LogForm {
    /// Logarithm of one
    pub const ZERO: Self = Self(0);

    /// Exponent i of alpha^i
    pub const fn exponent(self) -> usize {
        self.0 as usize
    }
}

/// Log/antilog tables for GF(2^m)
///
/// `alpha_to[i]` is alpha^i for `i` in `0..=n` (with alpha^n = 1) and
/// `index_of[x]` its inverse; `index_of[0]` is `None`.
#[derive(Debug, Clone)]
pub struct GaloisField {
    degree: u32,
    order: usize,
    primitive_poly: u32,
    alpha_to: Vec<PolyForm>,
    index_of: Vec<Option<LogForm>>,
}

impl GaloisField {
    /// Build GF(2^degree) from a primitive polynomial
    ///
    /// `primitive_poly` holds coefficient i of x^i in bit i, so x^5 + x^2 + 1
    /// is `0b100101`. Fails if the polynomial is not of degree `degree` or
    /// its powers of alpha repeat before covering every nonzero element.
    pub fn build(primitive_poly: u32, degree: u32) -> Result<Self, FuzzyError> {
        if !(2..=MAX_FIELD_DEGREE).contains(&degree) {
            return Err(FuzzyError::UnsupportedFieldDegree {
                degree,
                max: MAX_FIELD_DEGREE,
            });
        }
        if primitive_poly >> degree != 1 {
            return Err(FuzzyError::NotPrimitive {
                poly: primitive_poly,
                degree,
            });
        }

        let order = (1usize << degree) - 1;
        let top = 1u32 << degree;
        let mut alpha_to = vec![PolyForm::ZERO; order + 1];
        let mut index_of: Vec<Option<LogForm>> = vec![None; order + 1];

        // Companion recurrence: multiply by alpha, reduce by p(x) on overflow
        let mut x = 1u32;
        for (i, slot) in alpha_to.iter_mut().take(order).enumerate() {
            let entry = &mut index_of[x as usize];
            if x == 0 || entry.is_some() {
                return Err(FuzzyError::NotPrimitive {
                    poly: primitive_poly,
                    degree,
                });
            }
            *slot = PolyForm(x as u16);
            *entry = Some(LogForm(i as u16));

            x <<= 1;
            if x & top != 0 {
                x ^= primitive_poly;
            }
        }
        alpha_to[order] = PolyForm::ONE;

        Ok(Self {
            degree,
            order,
            primitive_poly,
            alpha_to,
            index_of,
        })
    }

    /// Build from coefficients `p[0]..=p[m]` (lowest degree first)
    pub fn from_coefficients(coefficients: &[u8]) -> Result<Self, FuzzyError> {
        let degree = coefficients.len().saturating_sub(1) as u32;
        if coefficients.len() > 32 {
            return Err(FuzzyError::UnsupportedFieldDegree {
                degree,
                max: MAX_FIELD_DEGREE,
            });
        }
        let poly = coefficients
            .iter()
            .enumerate()
            .filter(|(_, &c)| c != 0)
            .fold(0u32, |acc, (i, _)| acc | (1 << i));
        Self::build(poly, degree)
    }

    /// Degree m of the extension
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Multiplicative group order n = 2^m - 1
    pub fn order(&self) -> usize {
        self.order
    }

    /// Primitive polynomial bit pattern
    pub fn primitive_poly(&self) -> u32 {
        self.primitive_poly
    }

    /// Antilog table, indexed by exponent `0..=n`
    pub fn alpha_to(&self) -> &[PolyForm] {
        &self.alpha_to
    }

    /// Log table, indexed by element bit pattern `0..=n`
    pub fn index_of(&self) -> &[Option<LogForm>] {
        &self.index_of
    }

    /// alpha^i in polynomial form
    pub fn exp(&self, log: LogForm) -> PolyForm {
        self.alpha_to[log.exponent()]
    }

    /// Discrete log of `x`, `None` for zero
    pub fn log(&self, x: PolyForm) -> Option<LogForm> {
        self.index_of.get(x.bits() as usize).copied().flatten()
    }

    /// alpha^(e mod n)
    pub fn alpha_pow(&self, exponent: usize) -> PolyForm {
        self.alpha_to[exponent % self.order]
    }

    /// Product in log form: alpha^a * alpha^b
    pub fn log_mul(&self, a: LogForm, b: LogForm) -> LogForm {
        self.log_shift(a, b.exponent())
    }

    /// Quotient in log form: alpha^a / alpha^b
    pub fn log_div(&self, a: LogForm, b: LogForm) -> LogForm {
        LogForm(((a.exponent() + self.order - b.exponent()) % self.order) as u16)
    }

    /// alpha^a * alpha^by
    pub fn log_shift(&self, a: LogForm, by: usize) -> LogForm {
        LogForm(((a.exponent() + by) % self.order) as u16)
    }

    /// Field multiplication via the log tables
    pub fn mul(&self, a: PolyForm, b: PolyForm) -> PolyForm {
        match (self.log(a), self.log(b)) {
            (Some(la), Some(lb)) => self.exp(self.log_mul(la, lb)),
            _ => PolyForm::ZERO,
        }
    }

    /// Multiplicative inverse, `None` for zero
    pub fn inv(&self, a: PolyForm) -> Option<PolyForm> {
        self.log(a)
            .map(|la| self.exp(self.log_div(LogForm::ZERO, la)))
    }

    /// Field division, `None` when dividing by zero
    pub fn div(&self, a: PolyForm, b: PolyForm) -> Option<PolyForm> {
        let lb = self.log(b)?;
        Some(match self.log(a) {
            Some(la) => self.exp(self.log_div(la, lb)),
            None => PolyForm::ZERO,
        })
    }
}
