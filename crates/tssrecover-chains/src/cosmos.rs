//! Cosmos SDK account addresses: Bech32 of HASH160(compressed pubkey).

use bech32::{ToBase32, Variant};

use crate::btc::pubkey_hash;
use crate::ChainError;

pub const THORCHAIN_HRP: &str = "thor";
pub const MAYACHAIN_HRP: &str = "maya";
pub const COSMOS_HUB_HRP: &str = "cosmos";

pub fn cosmos_address(public_key: &[u8], hrp: &str) -> Result<String, ChainError> {
    let hash = pubkey_hash(public_key)?;
    bech32::encode(hrp, hash.to_base32(), Variant::Bech32)
        .map_err(|e| ChainError::Encoding(e.to_string()))
}
