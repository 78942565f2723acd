//! tssrecover Shamir module
//!
//! Recombines GG20 threshold key shares into the private scalar they were
//! dealt from, by Lagrange interpolation at x = 0 over the curve's scalar
//! field (secp256k1 n for ECDSA, Ed25519 L for EdDSA).
//!
//! # Example
//!
//! ```
//! use num_bigint::BigUint;
//! use tssrecover_shamir::{split_secret, PrimeField};
//!
//! let field = PrimeField::secp256k1();
//! let secret = BigUint::from(0xC0FFEEu32);
//! let points = split_secret(&secret, 2, 3, &field, &mut rand::thread_rng()).unwrap();
//!
//! // Any two points recover the constant term
//! let recovered = field.interpolate_at_zero(&points[1..]).unwrap();
//! assert_eq!(recovered, secret);
//! ```

pub mod field;
pub mod shamir;

pub use field::PrimeField;
pub use shamir::{deal_shares, reconstruct, reconstruct_secret, split_secret, verify_shares};

use thiserror::Error;
use tssrecover_core::{KeyError, KeyType};

#[derive(Error, Debug)]
pub enum ShamirError {
    #[error("No shares supplied")]
    NoShares,
    #[error("Shares mix key types: {0} and {1}")]
    MixedKeyTypes(KeyType, KeyType),
    #[error("Duplicate share id {0}: interpolation is undefined")]
    DuplicateShareId(String),
    #[error("Interpolation produced the zero scalar; shares are corrupt or inconsistent")]
    DegenerateKey,
    #[error("Invalid threshold: need at least 1")]
    InvalidThreshold,
    #[error("Threshold exceeds share count")]
    ThresholdExceedsShares,
    #[error(transparent)]
    Key(#[from] KeyError),
}
