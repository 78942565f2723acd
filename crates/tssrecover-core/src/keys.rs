//! Reconstructed keys and their public halves.
//!
//! ECDSA keys live on secp256k1 and are exported as 33-byte compressed points.
//! EdDSA keys are raw Ed25519 scalars (not RFC 8032 seeds); their public key is
//! `scalar·B` encoded as a 32-byte compressed Edwards point.

use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use curve25519_dalek::edwards::CompressedEdwardsY;
use curve25519_dalek::{EdwardsPoint, Scalar as EdScalar};
use thiserror::Error;
use zeroize::Zeroize;

use crate::hd::{ExtendedPrivateKey, ExtendedPublicKey};
use crate::types::{ChainCode, DeclaredKey, KeyType, SecretScalar};

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),
    #[error("Invalid chain code: {0}")]
    InvalidChainCode(String),
    #[error("Derivation failed: {0}")]
    DerivationFailed(String),
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),
    #[error("{0} keys do not support HD derivation")]
    NoHdDerivation(KeyType),
}

/// Compressed secp256k1 public key for a big-endian scalar.
pub fn secp256k1_public_key(scalar: &SecretScalar) -> Result<PublicKey, KeyError> {
    let mut secret = SecretKey::from_slice(scalar.as_be_bytes())
        .map_err(|e| KeyError::InvalidScalar(e.to_string()))?;
    let public = secret.public_key(&Secp256k1::signing_only());
    secret.non_secure_erase();
    Ok(public)
}

/// Compressed Ed25519 public key (`scalar·B`) for a big-endian scalar.
pub fn ed25519_public_key(scalar: &SecretScalar) -> Result<[u8; 32], KeyError> {
    if scalar.is_zero() {
        return Err(KeyError::InvalidScalar("zero scalar".into()));
    }
    let le = scalar.to_le_bytes();
    let mut s = EdScalar::from_bytes_mod_order(*le);
    let point = EdwardsPoint::mul_base(&s);
    s.zeroize();
    Ok(point.compress().to_bytes())
}

/// Check that `bytes` is a valid secp256k1 point and return it compressed.
pub fn normalize_secp256k1_public_key(bytes: &[u8]) -> Result<[u8; 33], KeyError> {
    let public = PublicKey::from_slice(bytes).map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
    Ok(public.serialize())
}

/// Check that `bytes` is a valid compressed Edwards point.
pub fn normalize_ed25519_public_key(bytes: &[u8]) -> Result<[u8; 32], KeyError> {
    let arr: [u8; 32] = bytes.try_into().map_err(|_| {
        KeyError::InvalidPublicKey(format!("Ed25519 key must be 32 bytes, got {}", bytes.len()))
    })?;
    CompressedEdwardsY(arr)
        .decompress()
        .ok_or_else(|| KeyError::InvalidPublicKey("not a point on Ed25519".into()))?;
    Ok(arr)
}

/// Validate and canonicalise a public key of the given type.
pub fn normalize_public_key(key_type: KeyType, bytes: &[u8]) -> Result<Vec<u8>, KeyError> {
    match key_type {
        KeyType::Ecdsa => normalize_secp256k1_public_key(bytes).map(|k| k.to_vec()),
        KeyType::Eddsa => normalize_ed25519_public_key(bytes).map(|k| k.to_vec()),
    }
}

/// The output of interpolation: a root private key for one key type.
#[derive(Debug, Clone)]
pub struct ReconstructedKey {
    pub key_type: KeyType,
    /// Reduced modulo the key type's group order, never zero
    pub scalar: SecretScalar,
    pub chain_code: ChainCode,
}

impl ReconstructedKey {
    pub fn new(key_type: KeyType, scalar: SecretScalar, chain_code: ChainCode) -> Self {
        Self {
            key_type,
            scalar,
            chain_code,
        }
    }

    /// Public key bytes: 33-byte compressed secp256k1 or 32-byte Ed25519.
    pub fn public_key(&self) -> Result<Vec<u8>, KeyError> {
        match self.key_type {
            KeyType::Ecdsa => Ok(secp256k1_public_key(&self.scalar)?.serialize().to_vec()),
            KeyType::Eddsa => Ok(ed25519_public_key(&self.scalar)?.to_vec()),
        }
    }

    /// Root extended private key; ECDSA only.
    pub fn root_private(&self) -> Result<ExtendedPrivateKey, KeyError> {
        match self.key_type {
            KeyType::Ecdsa => ExtendedPrivateKey::from_scalar(&self.scalar, self.chain_code),
            KeyType::Eddsa => Err(KeyError::NoHdDerivation(KeyType::Eddsa)),
        }
    }

    /// Whether this key's public half equals the committee's declared key.
    pub fn matches_declared(&self, declared: &DeclaredKey) -> bool {
        if declared.key_type != self.key_type {
            return false;
        }
        let Ok(ours) = self.public_key() else {
            return false;
        };
        match normalize_public_key(declared.key_type, &declared.public_key) {
            Ok(theirs) => ours == theirs && declared.chain_code == self.chain_code,
            Err(_) => false,
        }
    }
}

impl DeclaredKey {
    /// Root extended public key; ECDSA only.
    pub fn root_public(&self) -> Result<ExtendedPublicKey, KeyError> {
        match self.key_type {
            KeyType::Ecdsa => ExtendedPublicKey::from_slice(&self.public_key, self.chain_code),
            KeyType::Eddsa => Err(KeyError::NoHdDerivation(KeyType::Eddsa)),
        }
    }
}
