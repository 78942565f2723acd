//! Addresses for chains keyed directly by the root Ed25519 public key.

use crate::hash::blake2b256;
use crate::ChainError;

/// Signature scheme flag Sui prepends before hashing; 0x00 is Ed25519.
pub const SUI_ED25519_FLAG: u8 = 0x00;

fn ed25519_key(public_key: &[u8]) -> Result<&[u8; 32], ChainError> {
    public_key.try_into().map_err(|_| {
        ChainError::InvalidPublicKey(format!(
            "Ed25519 key must be 32 bytes, got {}",
            public_key.len()
        ))
    })
}

/// Solana: Base58 of the raw 32-byte public key.
pub fn solana_address(public_key: &[u8]) -> Result<String, ChainError> {
    let key = ed25519_key(public_key)?;
    Ok(bs58::encode(key).into_string())
}

/// Sui: `0x` hex of BLAKE2b-256(flag || public key).
pub fn sui_address(public_key: &[u8]) -> Result<String, ChainError> {
    let key = ed25519_key(public_key)?;
    let mut preimage = [0u8; 33];
    preimage[0] = SUI_ED25519_FLAG;
    preimage[1..].copy_from_slice(key);
    Ok(format!("0x{}", hex::encode(blake2b256(&preimage))))
}
