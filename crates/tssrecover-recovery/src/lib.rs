//! tssrecover recovery
//!
//! Ties the pieces together: share policing, per-key-type reconstruction,
//! per-chain derivation and encoding, and the independent validator that
//! re-derives every address from the committee's public keys.
//!
//! ```text
//! ShareRecords -> recover() -> RecoveredKeySet
//!                                   |
//!         declared public keys -> validate() -> [ValidationResult] -> enforce(policy)
//! ```

pub mod policy;
pub mod recover;
pub mod validate;

pub use policy::{enforce, failed_chains, ValidationPolicy};
pub use recover::{recover, recover_with, RecoveredChain, RecoveredKeySet};
pub use validate::{derive_addresses, expected_address, validate, ValidationError, ValidationResult};

use thiserror::Error;
use tssrecover_chains::ChainError;
use tssrecover_core::{KeyError, KeyType};
use tssrecover_shamir::ShamirError;

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("Invalid threshold {0}: must be at least 1")]
    InvalidThreshold(usize),
    #[error("Insufficient shares{}: have {have}, need {need}", .key_type.map(|k| format!(" for {}", k)).unwrap_or_default())]
    InsufficientShares {
        key_type: Option<KeyType>,
        have: usize,
        need: usize,
    },
    #[error("Incompatible {key_type} shares: {field} of party {party} differs from the first share")]
    IncompatibleShares {
        key_type: KeyType,
        field: &'static str,
        party: String,
    },
    #[error("Validation failed for: {}", .chains.join(", "))]
    ValidationFailed { chains: Vec<String> },
    #[error(transparent)]
    Shamir(#[from] ShamirError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Key(#[from] KeyError),
}
