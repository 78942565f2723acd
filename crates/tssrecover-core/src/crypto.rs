//! Password-based encryption for vault payloads.
//!
//! AES-256-GCM with a key derived from the vault password. Sealed blobs are
//! laid out as `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//!
//! Two key derivations are understood:
//! - `sha256`: key = SHA-256(password). This is what the wallet's own exports
//!   use, so it is the default when a container names no KDF.
//! - `argon2id`: memory-hard derivation with an explicit salt and cost
//!   parameters carried in the container.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

/// Argon2id defaults for newly sealed containers
/// - m_cost: 64 MiB memory
/// - t_cost: 3 iterations
/// - p_cost: 4 lanes
const ARGON2_M_COST: u32 = 65536;
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;
const KEY_LEN: usize = 32;

/// Ceilings for cost parameters read from a container: 1 GiB memory,
/// 16 iterations and 16 lanes.
const ARGON2_MAX_M_COST: u32 = 1 << 20;
const ARGON2_MAX_T_COST: u32 = 16;
const ARGON2_MAX_P_COST: u32 = 16;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),
    #[error("Invalid ciphertext format")]
    InvalidFormat,
}

/// Key derivation parameters stored alongside an encrypted payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum KdfParams {
    #[default]
    Sha256,
    Argon2id {
        /// Hex-encoded salt
        salt: String,
        m_cost: u32,
        t_cost: u32,
        p_cost: u32,
    },
}

impl KdfParams {
    /// Argon2id with a fresh 16-byte salt and the default cost parameters.
    pub fn argon2id() -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        KdfParams::Argon2id {
            salt: hex::encode(salt),
            m_cost: ARGON2_M_COST,
            t_cost: ARGON2_T_COST,
            p_cost: ARGON2_P_COST,
        }
    }
}

fn derive_key(password: &str, kdf: &KdfParams) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    match kdf {
        KdfParams::Sha256 => {
            let digest = Sha256::digest(password.as_bytes());
            key.copy_from_slice(&digest);
        }
        KdfParams::Argon2id {
            salt,
            m_cost,
            t_cost,
            p_cost,
        } => {
            if *m_cost > ARGON2_MAX_M_COST
                || *t_cost > ARGON2_MAX_T_COST
                || *p_cost > ARGON2_MAX_P_COST
            {
                return Err(CryptoError::KeyDerivationFailed(format!(
                    "argon2id cost out of range (m={}, t={}, p={})",
                    m_cost, t_cost, p_cost
                )));
            }
            let salt = hex::decode(salt)
                .map_err(|e| CryptoError::KeyDerivationFailed(format!("salt: {}", e)))?;
            let params = Params::new(*m_cost, *t_cost, *p_cost, Some(KEY_LEN))
                .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password_into(password.as_bytes(), &salt, &mut key[..])
                .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
        }
    }
    Ok(key)
}

/// Encrypt `plaintext` under `password`. A fresh nonce is drawn per call.
pub fn seal(plaintext: &[u8], password: &str, kdf: &KdfParams) -> Result<Vec<u8>, CryptoError> {
    let key = derive_key(password, kdf)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt a blob produced by [`seal`] (or by the wallet's exporter).
///
/// # Errors
/// Wrong password and tampered data are indistinguishable by design of GCM;
/// both surface as `DecryptionFailed`.
pub fn open(
    sealed: &[u8],
    password: &str,
    kdf: &KdfParams,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::InvalidFormat);
    }

    let key = derive_key(password, kdf)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::DecryptionFailed("Invalid password or corrupted data".to_string()))
}
