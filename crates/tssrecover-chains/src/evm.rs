//! EVM account addresses.
//!
//! Keccak-256 of the 64-byte uncompressed point (no `0x04` prefix), last 20
//! bytes, lowercase hex. No EIP-55 checksum casing is applied.

use crate::btc::secp256k1_key;
use crate::hash::keccak256;
use crate::ChainError;

pub fn evm_address(public_key: &[u8]) -> Result<String, ChainError> {
    let key = secp256k1_key(public_key)?;
    let uncompressed = key.serialize_uncompressed();
    let digest = keccak256(&uncompressed[1..]);
    Ok(format!("0x{}", hex::encode(&digest[12..])))
}
