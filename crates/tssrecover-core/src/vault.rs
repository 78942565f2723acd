//! Vault share reader
//!
//! A vault container is Base64 text wrapping a small JSON envelope:
//!
//! ```text
//! base64({ "version": 1, "is_encrypted": true, "kdf": {...}, "vault": "<base64>" })
//! ```
//!
//! The inner `vault` field is the Base64 payload JSON, AES-256-GCM sealed when
//! `is_encrypted` is set (see [`crate::crypto`]). The payload carries the
//! committee public keys, the shared chain code and one GG20 key share per
//! key type held by this party.

use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{self, CryptoError, KdfParams};
use crate::keys::KeyError;
use crate::password::PasswordSource;
use crate::types::{ChainCode, KeyType, SecretScalar, ShareRecord};

/// Highest envelope version this reader understands.
pub const CONTAINER_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid base64 in {0}")]
    Base64(String),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Vault {vault} is encrypted and no password was supplied")]
    PasswordRequired { vault: String },
    #[error("Could not decrypt vault: {0}")]
    DecryptionFailed(#[from] CryptoError),
    #[error("Invalid vault format: {0}")]
    InvalidFormat(String),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("Password source failed: {0}")]
    PasswordSource(String),
}

/// The outer envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultContainer {
    pub version: u32,
    pub is_encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
    /// Base64 payload, sealed if `is_encrypted`
    pub vault: String,
}

/// Decrypted vault contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultPayload {
    pub name: String,
    pub local_party_id: String,
    #[serde(default)]
    pub public_key_ecdsa: String,
    #[serde(default)]
    pub public_key_eddsa: String,
    pub hex_chain_code: String,
    #[serde(default)]
    pub signers: Vec<String>,
    #[serde(default)]
    pub key_shares: Vec<KeySharePayload>,
}

/// One GG20 share as stored in the payload. Both numbers are decimal strings.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeySharePayload {
    #[zeroize(skip)]
    pub key_type: KeyType,
    pub share_id: String,
    pub xi: String,
}

impl fmt::Debug for KeySharePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySharePayload")
            .field("key_type", &self.key_type)
            .field("share_id", &self.share_id)
            .field("xi", &"[REDACTED]")
            .finish()
    }
}

impl VaultPayload {
    /// The declared public key for `key_type`, hex-decoded.
    fn declared_public_key(&self, key_type: KeyType) -> Result<Vec<u8>, VaultError> {
        let encoded = match key_type {
            KeyType::Ecdsa => &self.public_key_ecdsa,
            KeyType::Eddsa => &self.public_key_eddsa,
        };
        if encoded.trim().is_empty() {
            return Err(VaultError::InvalidFormat(format!(
                "vault {} has a {} share but no {} public key",
                self.name, key_type, key_type
            )));
        }
        hex::decode(encoded.trim()).map_err(|e| {
            VaultError::InvalidFormat(format!("{} public key is not hex: {}", key_type, e))
        })
    }

    /// Flatten the payload into one [`ShareRecord`] per key share.
    pub fn share_records(&self) -> Result<Vec<ShareRecord>, VaultError> {
        if self.key_shares.is_empty() {
            return Err(VaultError::InvalidFormat(format!(
                "vault {} has no GG20 key_shares",
                self.name
            )));
        }
        let chain_code: ChainCode = self.hex_chain_code.parse()?;

        let mut records = Vec::with_capacity(self.key_shares.len());
        for share in &self.key_shares {
            let share_id = parse_decimal(&share.share_id, "share_id")?;
            if share_id.is_zero() {
                return Err(VaultError::InvalidFormat("share_id must be non-zero".into()));
            }
            let secret_share = SecretScalar::from_biguint(&parse_decimal(&share.xi, "xi")?)?;

            records.push(ShareRecord {
                party_id: self.local_party_id.clone(),
                key_type: share.key_type,
                share_id,
                secret_share,
                chain_code,
                declared_public_key: self.declared_public_key(share.key_type)?,
            });
        }
        Ok(records)
    }
}

fn parse_decimal(value: &str, field: &str) -> Result<BigUint, VaultError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VaultError::InvalidFormat(format!(
            "{} must be a decimal integer",
            field
        )));
    }
    value
        .parse::<BigUint>()
        .map_err(|e| VaultError::InvalidFormat(format!("{}: {}", field, e)))
}

fn decode_base64(data: &str, what: &str) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map(Zeroizing::new)
        .map_err(|e| VaultError::Base64(format!("{}: {}", what, e)))
}

/// Decode and, if needed, decrypt a container into its payload.
///
/// `label` names the vault in errors and is the key handed to `passwords`.
pub fn open_container(
    text: &str,
    passwords: &dyn PasswordSource,
    label: &str,
) -> Result<VaultPayload, VaultError> {
    let envelope = decode_base64(text, label)?;
    let container: VaultContainer = serde_json::from_slice(&envelope)?;

    if container.version > CONTAINER_VERSION {
        return Err(VaultError::InvalidFormat(format!(
            "unsupported container version {}",
            container.version
        )));
    }

    let inner = decode_base64(&container.vault, label)?;
    let plaintext = if container.is_encrypted {
        let password = passwords
            .password(label)?
            .ok_or_else(|| VaultError::PasswordRequired {
                vault: label.to_string(),
            })?;
        let kdf = container.kdf.unwrap_or_default();
        crypto::open(&inner, &password, &kdf)?
    } else {
        inner
    };

    let payload: VaultPayload = serde_json::from_slice(&plaintext)?;
    log::debug!(
        "Opened vault {} (party {}, {} key shares)",
        payload.name,
        payload.local_party_id,
        payload.key_shares.len()
    );
    Ok(payload)
}

/// Parse an in-memory container into share records.
pub fn parse_container(
    text: &str,
    passwords: &dyn PasswordSource,
    label: &str,
) -> Result<Vec<ShareRecord>, VaultError> {
    open_container(text, passwords, label)?.share_records()
}

/// Read a container file into share records.
pub fn read_shares(
    path: impl AsRef<Path>,
    passwords: &dyn PasswordSource,
) -> Result<Vec<ShareRecord>, VaultError> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| VaultError::Io {
        path: label.clone(),
        source,
    })?;
    let records = parse_container(&text, passwords, &label)?;
    log::info!("Read {} share(s) from {}", records.len(), label);
    Ok(records)
}

/// Produce a container for `payload`, encrypted when a password is given.
pub fn seal_container(
    payload: &VaultPayload,
    password: Option<&str>,
    kdf: KdfParams,
) -> Result<String, VaultError> {
    let plaintext = Zeroizing::new(serde_json::to_vec(payload)?);

    let container = match password {
        Some(password) => VaultContainer {
            version: CONTAINER_VERSION,
            is_encrypted: true,
            vault: STANDARD.encode(crypto::seal(&plaintext, password, &kdf)?),
            kdf: Some(kdf),
        },
        None => VaultContainer {
            version: CONTAINER_VERSION,
            is_encrypted: false,
            kdf: None,
            vault: STANDARD.encode(&*plaintext),
        },
    };

    Ok(STANDARD.encode(serde_json::to_vec(&container)?))
}
