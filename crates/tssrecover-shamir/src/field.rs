//! Arithmetic modulo a prime group order
//!
//! Threshold shares live in the scalar field of their curve: the secp256k1
//! group order for ECDSA and the Ed25519 subgroup order L for EdDSA. Both are
//! prime, so inverses are computed with Fermat's little theorem.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use tssrecover_core::KeyType;

use crate::ShamirError;

/// secp256k1 group order n
pub const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Ed25519 prime subgroup order L = 2^252 + 27742317777372353535851937790883648493
pub const ED25519_ORDER: [u8; 32] = [
    0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x14, 0xDE, 0xF9, 0xDE, 0xA2, 0xF7, 0x9C, 0xD6, 0x58, 0x12, 0x63, 0x1A, 0x5C, 0xF5, 0xD3, 0xED,
];

/// A prime field Z/pZ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeField {
    order: BigUint,
}

impl PrimeField {
    /// `order` must be prime; [`inv`](Self::inv) relies on it.
    pub fn new(order: BigUint) -> Self {
        Self { order }
    }

    pub fn secp256k1() -> Self {
        Self::new(BigUint::from_bytes_be(&SECP256K1_ORDER))
    }

    pub fn ed25519() -> Self {
        Self::new(BigUint::from_bytes_be(&ED25519_ORDER))
    }

    /// The scalar field a key type's shares are interpolated in.
    pub fn for_key_type(key_type: KeyType) -> Self {
        match key_type {
            KeyType::Ecdsa => Self::secp256k1(),
            KeyType::Eddsa => Self::ed25519(),
        }
    }

    pub fn order(&self) -> &BigUint {
        &self.order
    }

    #[inline]
    pub fn reduce(&self, a: &BigUint) -> BigUint {
        a % &self.order
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.order
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let a = self.reduce(a);
        let b = self.reduce(b);
        (a + &self.order - b) % &self.order
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.order
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        (&self.order - self.reduce(a)) % &self.order
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn inv(&self, a: &BigUint) -> Option<BigUint> {
        let a = self.reduce(a);
        if a.is_zero() {
            return None;
        }
        let exponent = &self.order - BigUint::from(2u8);
        Some(a.modpow(&exponent, &self.order))
    }

    /// Evaluate a polynomial at `x`.
    /// coefficients[0] is the constant term.
    pub fn eval_poly(&self, coefficients: &[BigUint], x: &BigUint) -> BigUint {
        // Horner's method
        let mut result = BigUint::zero();
        for coef in coefficients.iter().rev() {
            result = self.add(&self.mul(&result, x), coef);
        }
        result
    }

    /// Lagrange interpolation of the polynomial through `points` at x = 0.
    ///
    /// `points` are `(x, y)` pairs. Every x must be distinct modulo the field
    /// order; a repeated x makes a basis denominator zero and is reported as
    /// [`ShamirError::DuplicateShareId`].
    pub fn interpolate_at_zero(&self, points: &[(BigUint, BigUint)]) -> Result<BigUint, ShamirError> {
        if points.is_empty() {
            return Err(ShamirError::NoShares);
        }

        let xs: Vec<BigUint> = points.iter().map(|(x, _)| self.reduce(x)).collect();
        for (i, xi) in xs.iter().enumerate() {
            if xs[..i].contains(xi) {
                return Err(ShamirError::DuplicateShareId(points[i].0.to_string()));
            }
        }

        let mut secret = BigUint::zero();
        for (i, (_, yi)) in points.iter().enumerate() {
            // L_i(0) = prod_{j != i} x_j / (x_j - x_i)
            let mut numerator = BigUint::one();
            let mut denominator = BigUint::one();
            for (j, xj) in xs.iter().enumerate() {
                if i != j {
                    numerator = self.mul(&numerator, xj);
                    denominator = self.mul(&denominator, &self.sub(xj, &xs[i]));
                }
            }
            let inverse = self
                .inv(&denominator)
                .ok_or_else(|| ShamirError::DuplicateShareId(points[i].0.to_string()))?;
            let basis = self.mul(&numerator, &inverse);
            secret = self.add(&secret, &self.mul(&self.reduce(yi), &basis));
        }

        Ok(secret)
    }
}
