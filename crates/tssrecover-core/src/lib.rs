//! tssrecover core
//!
//! Shared types and key handling for recovering a single-signer key from
//! GG20-style threshold key shares.
//!
//! # Contents
//!
//! - [`types`]: share records, key types, chain codes and secret scalars
//! - [`hd`]: BIP-32 child derivation with every index forced non-hardened
//! - [`keys`]: public keys for reconstructed scalars (secp256k1 / Ed25519)
//! - [`vault`]: the vault share reader (Base64 envelope, AES-256-GCM payload)
//! - [`password`]: injected password sources for encrypted vaults
//! - [`memory`]: process hardening for secret material

pub mod crypto;
pub mod hd;
pub mod keys;
pub mod memory;
pub mod password;
pub mod types;
pub mod vault;

pub use crypto::{CryptoError, KdfParams};
pub use hd::{DerivationPath, ExtendedPrivateKey, ExtendedPublicKey};
pub use keys::{KeyError, ReconstructedKey};
pub use password::{FixedPassword, NoPassword, PasswordMap, PasswordSource};
pub use types::*;
pub use vault::{
    open_container, parse_container, read_shares, seal_container, KeySharePayload, VaultContainer,
    VaultError, VaultPayload,
};
