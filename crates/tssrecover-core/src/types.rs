//! Core data model shared by every tssrecover crate.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::keys::KeyError;

/// Signature scheme a share (and the key it reconstructs) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// secp256k1 ECDSA
    Ecdsa,
    /// Ed25519 EdDSA
    Eddsa,
}

impl KeyType {
    pub const ALL: [KeyType; 2] = [KeyType::Ecdsa, KeyType::Eddsa];

    /// Lowercase identifier used in files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ecdsa => "ecdsa",
            KeyType::Eddsa => "eddsa",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Ecdsa => write!(f, "ECDSA"),
            KeyType::Eddsa => write!(f, "EdDSA"),
        }
    }
}

impl FromStr for KeyType {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecdsa" | "secp256k1" => Ok(KeyType::Ecdsa),
            "eddsa" | "ed25519" => Ok(KeyType::Eddsa),
            other => Err(KeyError::UnsupportedKeyType(other.to_string())),
        }
    }
}

/// 32-byte BIP-32 chain code shared by every party of a vault.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainCode(pub [u8; 32]);

impl ChainCode {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ChainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ChainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainCode({})", self)
    }
}

impl FromStr for ChainCode {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| KeyError::InvalidChainCode(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| KeyError::InvalidChainCode(format!("expected 32 bytes, got {}", v.len())))?;
        Ok(ChainCode(arr))
    }
}

impl TryFrom<String> for ChainCode {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChainCode> for String {
    fn from(value: ChainCode) -> Self {
        value.to_string()
    }
}

/// A 256-bit secret scalar, stored big-endian and wiped on drop.
///
/// Used for share values (`Xi`), reconstructed root keys and derived child keys.
/// `Debug` never prints the value.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretScalar([u8; 32]);

impl SecretScalar {
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Left-pad `value` to 32 big-endian bytes.
    pub fn from_biguint(value: &BigUint) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(value.to_bytes_be());
        if bytes.len() > 32 {
            return Err(KeyError::InvalidScalar(format!(
                "value is {} bytes, expected at most 32",
                bytes.len()
            )));
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(out))
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(
            hex::decode(s.trim()).map_err(|e| KeyError::InvalidScalar(e.to_string()))?,
        );
        if bytes.len() != 32 {
            return Err(KeyError::InvalidScalar(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    pub fn as_be_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Little-endian copy, the byte order Ed25519 scalars use.
    pub fn to_le_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut le = Zeroizing::new(self.0);
        le.reverse();
        le
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }
}

impl PartialEq for SecretScalar {
    fn eq(&self, other: &Self) -> bool {
        // Fold over every byte so timing does not depend on the first difference.
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Eq for SecretScalar {}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar([REDACTED])")
    }
}

/// One party's contribution to a threshold key, as produced by the vault reader.
#[derive(Clone)]
pub struct ShareRecord {
    /// Opaque signer identifier
    pub party_id: String,
    pub key_type: KeyType,
    /// Evaluation point x_i
    pub share_id: BigUint,
    /// Evaluation value y_i (Xi)
    pub secret_share: SecretScalar,
    pub chain_code: ChainCode,
    /// The committee public key for `key_type`
    pub declared_public_key: Vec<u8>,
}

impl ShareRecord {
    /// The public half of this record: what the committee declared.
    pub fn declared(&self) -> DeclaredKey {
        DeclaredKey {
            key_type: self.key_type,
            public_key: self.declared_public_key.clone(),
            chain_code: self.chain_code,
        }
    }
}

impl fmt::Debug for ShareRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareRecord")
            .field("party_id", &self.party_id)
            .field("key_type", &self.key_type)
            .field("share_id", &self.share_id)
            .field("secret_share", &self.secret_share)
            .field("chain_code", &self.chain_code)
            .field("declared_public_key", &hex::encode(&self.declared_public_key))
            .finish()
    }
}

/// A committee public key together with the chain code it derives under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredKey {
    pub key_type: KeyType,
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,
    pub chain_code: ChainCode,
}

/// Serde adapter for byte vectors as lowercase hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim()).map_err(serde::de::Error::custom)
    }
}
