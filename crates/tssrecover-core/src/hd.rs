//! BIP-32 child key derivation, non-hardened only.
//!
//! The wallet lists addresses from the committee public key and chain code
//! alone, which only works for non-hardened children. Recovery has to land on
//! the same addresses, so every path component is derived as non-hardened even
//! when it is written with a hardened marker (`84'`, `84h`).
//!
//! For an index `i` and parent key `K` (compressed) with chain code `c`:
//!
//! ```text
//! I       = HMAC-SHA512(key = c, data = ser_P(K) || ser_32(i))
//! c_child = I_R
//! k_child = parse_256(I_L) + k_parent  (mod n)      private derivation
//! K_child = parse_256(I_L)·G + K_parent              public derivation
//! ```

use std::fmt;
use std::str::FromStr;

use bitcoin::hashes::{sha512, Hash, HashEngine, Hmac, HmacEngine};
use bitcoin::secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use zeroize::Zeroize;

use crate::keys::KeyError;
use crate::types::{ChainCode, SecretScalar};

/// First hardened index (2^31).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A parsed derivation path. Every component is non-hardened.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    indices: Vec<u32>,
    had_hardened_markers: bool,
}

impl DerivationPath {
    /// The root path `m`.
    pub fn root() -> Self {
        Self {
            indices: Vec::new(),
            had_hardened_markers: false,
        }
    }

    pub fn from_indices(indices: Vec<u32>) -> Result<Self, KeyError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= HARDENED_OFFSET) {
            return Err(KeyError::InvalidPath(format!(
                "index {} is outside the non-hardened range",
                index
            )));
        }
        Ok(Self {
            indices,
            had_hardened_markers: false,
        })
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Always true: hardened markers are stripped during parsing.
    pub fn non_hardened(&self) -> bool {
        true
    }

    /// Whether the literal path carried `'`/`h` markers that were ignored.
    pub fn had_hardened_markers(&self) -> bool {
        self.had_hardened_markers
    }

    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }
}

impl FromStr for DerivationPath {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut components = trimmed.split('/');

        match components.next() {
            Some("m") | Some("M") => {}
            _ => {
                return Err(KeyError::InvalidPath(format!(
                    "{:?} does not start with \"m\"",
                    trimmed
                )))
            }
        }

        let mut indices = Vec::new();
        let mut had_hardened_markers = false;

        for component in components {
            let digits = match component.strip_suffix(|c: char| matches!(c, '\'' | 'h' | 'H')) {
                Some(stripped) => {
                    had_hardened_markers = true;
                    stripped
                }
                None => component,
            };

            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(KeyError::InvalidPath(format!(
                    "component {:?} in {:?} is not a number",
                    component, trimmed
                )));
            }

            let index: u32 = digits.parse().map_err(|_| {
                KeyError::InvalidPath(format!("component {:?} does not fit in 32 bits", component))
            })?;

            if index >= HARDENED_OFFSET {
                return Err(KeyError::InvalidPath(format!(
                    "component {:?} is outside the non-hardened range",
                    component
                )));
            }

            indices.push(index);
        }

        if had_hardened_markers {
            log::debug!("path {} normalised to non-hardened derivation", trimmed);
        }

        Ok(Self {
            indices,
            had_hardened_markers,
        })
    }
}

impl fmt::Display for DerivationPath {
    /// Normalised form, without hardened markers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.indices {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

/// HMAC step shared by private and public derivation.
///
/// Returns the `I_L` tweak and the child chain code `I_R`.
fn child_tweak(
    chain_code: &ChainCode,
    parent: &PublicKey,
    index: u32,
) -> Result<(Scalar, ChainCode), KeyError> {
    if index >= HARDENED_OFFSET {
        return Err(KeyError::DerivationFailed(format!(
            "index {} is hardened",
            index
        )));
    }

    let mut engine = HmacEngine::<sha512::Hash>::new(&chain_code.0);
    engine.input(&parent.serialize());
    engine.input(&index.to_be_bytes());
    let hmac_result = Hmac::from_engine(engine);

    let mut il = [0u8; 32];
    il.copy_from_slice(&hmac_result[..32]);
    let tweak = Scalar::from_be_bytes(il);
    il.zeroize();
    let tweak = tweak.map_err(|_| {
        KeyError::DerivationFailed(format!("I_L at index {} is not below the curve order", index))
    })?;

    let mut child_chain_code = [0u8; 32];
    child_chain_code.copy_from_slice(&hmac_result[32..]);

    Ok((tweak, ChainCode(child_chain_code)))
}

/// A secp256k1 private key with its chain code.
#[derive(Clone)]
pub struct ExtendedPrivateKey {
    secret: SecretKey,
    chain_code: ChainCode,
}

impl ExtendedPrivateKey {
    pub fn new(secret: SecretKey, chain_code: ChainCode) -> Self {
        Self { secret, chain_code }
    }

    pub fn from_scalar(scalar: &SecretScalar, chain_code: ChainCode) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(scalar.as_be_bytes())
            .map_err(|e| KeyError::InvalidScalar(e.to_string()))?;
        Ok(Self::new(secret, chain_code))
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    /// The private key as a big-endian scalar.
    pub fn to_scalar(&self) -> SecretScalar {
        SecretScalar::from_be_bytes(self.secret.secret_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key(&Secp256k1::signing_only())
    }

    pub fn to_public(&self) -> ExtendedPublicKey {
        ExtendedPublicKey::new(self.public_key(), self.chain_code)
    }

    pub fn derive_child(&self, index: u32) -> Result<Self, KeyError> {
        let (tweak, chain_code) = child_tweak(&self.chain_code, &self.public_key(), index)?;
        let secret = self
            .secret
            .add_tweak(&tweak)
            .map_err(|e| KeyError::DerivationFailed(format!("index {}: {}", index, e)))?;
        Ok(Self { secret, chain_code })
    }

    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, KeyError> {
        let mut current = self.clone();
        for &index in path.indices() {
            current = current.derive_child(index)?;
        }
        Ok(current)
    }
}

impl Drop for ExtendedPrivateKey {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivateKey")
            .field("secret", &"[REDACTED]")
            .field("chain_code", &self.chain_code)
            .finish()
    }
}

/// A secp256k1 public key with its chain code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    public: PublicKey,
    chain_code: ChainCode,
}

impl ExtendedPublicKey {
    pub fn new(public: PublicKey, chain_code: ChainCode) -> Self {
        Self { public, chain_code }
    }

    /// Parse a compressed (33-byte) or uncompressed (65-byte) public key.
    pub fn from_slice(public_key: &[u8], chain_code: ChainCode) -> Result<Self, KeyError> {
        let public = PublicKey::from_slice(public_key)
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
        Ok(Self::new(public, chain_code))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    pub fn derive_child(&self, index: u32) -> Result<Self, KeyError> {
        let (tweak, chain_code) = child_tweak(&self.chain_code, &self.public, index)?;
        let public = self
            .public
            .add_exp_tweak(&Secp256k1::verification_only(), &tweak)
            .map_err(|e| KeyError::DerivationFailed(format!("index {}: {}", index, e)))?;
        Ok(Self { public, chain_code })
    }

    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, KeyError> {
        let mut current = *self;
        for &index in path.indices() {
            current = current.derive_child(index)?;
        }
        Ok(current)
    }
}
