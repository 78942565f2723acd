//! Recovery validator
//!
//! Derives every chain address a second time, straight from the committee's
//! declared public keys and chain code, and compares it with the address
//! produced from the reconstructed private key. No private material is
//! involved on this side, so it is the same derivation a watch-only listing
//! performs.
//!
//! Validation is exhaustive: every chain gets a [`ValidationResult`] even
//! after an earlier chain failed.

use std::collections::BTreeMap;

use thiserror::Error;
use tssrecover_chains::{lookup, registry, ChainAddressSpec, DerivedAddress};
use tssrecover_core::{keys, DeclaredKey, KeyError, KeyType};

use crate::RecoveryError;

/// Why a single chain failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("address mismatch on {chain}: expected {expected}, recovered {recovered}")]
    AddressMismatch {
        chain: String,
        expected: String,
        recovered: String,
    },
    #[error("no declared {key_type} public key to check {chain} against")]
    MissingDeclaredKey { chain: String, key_type: KeyType },
    #[error("could not derive expected address: {0}")]
    Derivation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub chain: String,
    pub passed: bool,
    pub recovered_address: String,
    /// Empty when the expected address could not be derived
    pub expected_address: String,
    pub error: Option<ValidationError>,
}

impl ValidationResult {
    fn failed(recovered: &DerivedAddress, expected: String, error: ValidationError) -> Self {
        Self {
            chain: recovered.chain.clone(),
            passed: false,
            recovered_address: recovered.address.clone(),
            expected_address: expected,
            error: Some(error),
        }
    }
}

/// Address for `chain` derived from a declared (public) key only.
pub fn expected_address(
    chain: &ChainAddressSpec,
    declared: &DeclaredKey,
) -> Result<DerivedAddress, RecoveryError> {
    chain.ensure_key_type(declared.key_type)?;
    let path = chain.derivation_path()?;

    let public_key = match declared.key_type {
        KeyType::Ecdsa => declared
            .root_public()?
            .derive_path(&path)?
            .public_key()
            .serialize()
            .to_vec(),
        KeyType::Eddsa if path.is_root() => {
            keys::normalize_ed25519_public_key(&declared.public_key)?.to_vec()
        }
        KeyType::Eddsa => return Err(KeyError::NoHdDerivation(KeyType::Eddsa).into()),
    };

    Ok(tssrecover_chains::encode(chain, &public_key, &path.to_string())?)
}

/// Public-only address listing for `chains`, or for every registry chain of
/// `declared`'s key type when `chains` is empty.
///
/// An explicitly requested chain of the other key type is an error.
pub fn derive_addresses(
    declared: &DeclaredKey,
    chains: &[&ChainAddressSpec],
) -> Result<Vec<DerivedAddress>, RecoveryError> {
    if chains.is_empty() {
        return registry::for_key_type(declared.key_type)
            .map(|c| expected_address(c, declared))
            .collect();
    }

    for chain in chains {
        chain.ensure_key_type(declared.key_type)?;
    }
    chains
        .iter()
        .map(|c| expected_address(c, declared))
        .collect()
}

/// Check each recovered address against the independently derived one.
pub fn validate(
    recovered: &[DerivedAddress],
    declared: &BTreeMap<KeyType, DeclaredKey>,
) -> Vec<ValidationResult> {
    recovered
        .iter()
        .map(|address| validate_one(address, declared))
        .collect()
}

fn validate_one(
    recovered: &DerivedAddress,
    declared: &BTreeMap<KeyType, DeclaredKey>,
) -> ValidationResult {
    let spec = match lookup(&recovered.chain) {
        Ok(spec) => spec,
        Err(e) => {
            return ValidationResult::failed(
                recovered,
                String::new(),
                ValidationError::Derivation(e.to_string()),
            )
        }
    };

    let Some(declared_key) = declared.get(&spec.key_type) else {
        return ValidationResult::failed(
            recovered,
            String::new(),
            ValidationError::MissingDeclaredKey {
                chain: spec.name.to_string(),
                key_type: spec.key_type,
            },
        );
    };

    let expected = match expected_address(spec, declared_key) {
        Ok(expected) => expected.address,
        Err(e) => {
            return ValidationResult::failed(
                recovered,
                String::new(),
                ValidationError::Derivation(e.to_string()),
            )
        }
    };

    if expected == recovered.address {
        log::debug!("{}: {} verified", recovered.chain, recovered.address);
        ValidationResult {
            chain: recovered.chain.clone(),
            passed: true,
            recovered_address: recovered.address.clone(),
            expected_address: expected,
            error: None,
        }
    } else {
        log::warn!(
            "{}: recovered {} but the vault's public key gives {}",
            recovered.chain,
            recovered.address,
            expected
        );
        let error = ValidationError::AddressMismatch {
            chain: recovered.chain.clone(),
            expected: expected.clone(),
            recovered: recovered.address.clone(),
        };
        ValidationResult::failed(recovered, expected, error)
    }
}
