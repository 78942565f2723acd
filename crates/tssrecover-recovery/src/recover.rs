//! Reconstruction orchestrator
//!
//! Checks share counts and metadata for every key type up front, then
//! interpolates each key type once and derives one child key per distinct
//! derivation path. Chains that name the same path (all EVM chains) reuse the
//! same child key and therefore the same address.

use std::collections::{BTreeMap, HashMap};

use tssrecover_chains::{registry, ChainAddressSpec, DerivedAddress};
use tssrecover_core::{
    keys::KeyError, DeclaredKey, DerivationPath, KeyType, ReconstructedKey, SecretScalar,
    ShareRecord,
};
use tssrecover_shamir::{reconstruct_secret, verify_shares, PrimeField};

use crate::RecoveryError;

/// One chain's recovered address and the child key behind it.
#[derive(Debug, Clone)]
pub struct RecoveredChain {
    pub address: DerivedAddress,
    pub key_type: KeyType,
    pub public_key: Vec<u8>,
    pub private_key: SecretScalar,
}

/// Output of a successful recovery.
#[derive(Debug, Clone, Default)]
pub struct RecoveredKeySet {
    /// Root keys by type
    pub keys: BTreeMap<KeyType, ReconstructedKey>,
    /// What the committee declared, taken from the shares
    pub declared: BTreeMap<KeyType, DeclaredKey>,
    /// Per-chain results, in the order the chains were requested
    pub chains: Vec<RecoveredChain>,
}

impl RecoveredKeySet {
    /// Whether the reconstructed root public key for `key_type` equals the
    /// declared committee key. `false` if either side is absent.
    pub fn root_matches_declared(&self, key_type: KeyType) -> bool {
        match (self.keys.get(&key_type), self.declared.get(&key_type)) {
            (Some(key), Some(declared)) => key.matches_declared(declared),
            _ => false,
        }
    }

    /// The derived address of every recovered chain.
    pub fn addresses(&self) -> Vec<DerivedAddress> {
        self.chains.iter().map(|c| c.address.clone()).collect()
    }

    pub fn chain(&self, name: &str) -> Option<&RecoveredChain> {
        self.chains
            .iter()
            .find(|c| c.address.chain.eq_ignore_ascii_case(name))
    }
}

/// Recover every registry chain from `shares`.
pub fn recover(shares: &[ShareRecord], threshold: usize) -> Result<RecoveredKeySet, RecoveryError> {
    let chains: Vec<&ChainAddressSpec> = registry::all().iter().collect();
    recover_with(shares, threshold, &chains)
}

/// Recover the given chains from `shares`.
///
/// Chains whose key type has no shares are skipped. Every share of a key
/// type takes part in interpolation, including any beyond `threshold`.
pub fn recover_with(
    shares: &[ShareRecord],
    threshold: usize,
    chains: &[&ChainAddressSpec],
) -> Result<RecoveredKeySet, RecoveryError> {
    if threshold == 0 {
        return Err(RecoveryError::InvalidThreshold(threshold));
    }

    let groups = group_by_key_type(shares);
    if groups.is_empty() {
        return Err(RecoveryError::InsufficientShares {
            key_type: None,
            have: 0,
            need: threshold,
        });
    }

    // All policing happens before any interpolation
    let mut declared = BTreeMap::new();
    for (&key_type, group) in &groups {
        if group.len() < threshold {
            return Err(RecoveryError::InsufficientShares {
                key_type: Some(key_type),
                have: group.len(),
                need: threshold,
            });
        }
        declared.insert(key_type, check_compatible(key_type, group)?);
    }

    let mut keys = BTreeMap::new();
    for (&key_type, group) in &groups {
        let owned: Vec<ShareRecord> = group.iter().map(|s| (*s).clone()).collect();
        if owned.len() > threshold && !verify_shares(&owned, threshold)? {
            log::warn!(
                "{} shares do not all lie on one polynomial; the result will not match the vault",
                key_type
            );
        }
        let scalar = reconstruct_secret(&owned, &PrimeField::for_key_type(key_type))?;
        let key = ReconstructedKey::new(key_type, scalar, declared[&key_type].chain_code);
        log::info!(
            "Reconstructed {} key from {} share(s) (threshold {})",
            key_type,
            owned.len(),
            threshold
        );
        keys.insert(key_type, key);
    }

    let mut set = RecoveredKeySet {
        keys,
        declared,
        chains: Vec::with_capacity(chains.len()),
    };
    for key_type in KeyType::ALL {
        if set.keys.contains_key(&key_type) && !set.root_matches_declared(key_type) {
            log::warn!(
                "Reconstructed {} root key does not match the declared public key",
                key_type
            );
        }
    }

    let mut derived: HashMap<(KeyType, DerivationPath), (SecretScalar, Vec<u8>)> = HashMap::new();
    for spec in chains {
        let Some(root) = set.keys.get(&spec.key_type) else {
            log::info!("No {} shares; skipping {}", spec.key_type, spec.name);
            continue;
        };
        let path = spec.derivation_path()?;
        let cache_key = (spec.key_type, path.clone());
        if !derived.contains_key(&cache_key) {
            log::debug!("Deriving {} child at {}", spec.key_type, path);
            derived.insert(cache_key.clone(), derive_child(root, &path)?);
        }
        let (private_key, public_key) = &derived[&cache_key];

        let address = tssrecover_chains::encode(spec, public_key, &path.to_string())?;
        set.chains.push(RecoveredChain {
            address,
            key_type: spec.key_type,
            public_key: public_key.clone(),
            private_key: private_key.clone(),
        });
    }

    Ok(set)
}

fn group_by_key_type(shares: &[ShareRecord]) -> BTreeMap<KeyType, Vec<&ShareRecord>> {
    let mut groups: BTreeMap<KeyType, Vec<&ShareRecord>> = BTreeMap::new();
    for share in shares {
        groups.entry(share.key_type).or_default().push(share);
    }
    groups
}

/// Every share of one key type must agree on chain code and committee key.
fn check_compatible(key_type: KeyType, group: &[&ShareRecord]) -> Result<DeclaredKey, RecoveryError> {
    let first = group[0];
    for share in &group[1..] {
        if share.chain_code != first.chain_code {
            return Err(RecoveryError::IncompatibleShares {
                key_type,
                field: "chain_code",
                party: share.party_id.clone(),
            });
        }
        if share.declared_public_key != first.declared_public_key {
            return Err(RecoveryError::IncompatibleShares {
                key_type,
                field: "declared_public_key",
                party: share.party_id.clone(),
            });
        }
    }
    Ok(first.declared())
}

/// Child private scalar and public key bytes at `path`.
fn derive_child(
    root: &ReconstructedKey,
    path: &DerivationPath,
) -> Result<(SecretScalar, Vec<u8>), RecoveryError> {
    match root.key_type {
        KeyType::Ecdsa => {
            let child = root.root_private()?.derive_path(path)?;
            Ok((child.to_scalar(), child.public_key().serialize().to_vec()))
        }
        KeyType::Eddsa if path.is_root() => Ok((root.scalar.clone(), root.public_key()?)),
        KeyType::Eddsa => Err(KeyError::NoHdDerivation(KeyType::Eddsa).into()),
    }
}
