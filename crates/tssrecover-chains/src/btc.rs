//! Bitcoin-family address and key encodings.
//!
//! Everything here starts from HASH160 of the compressed secp256k1 public key:
//! Base58Check P2PKH with a per-chain version byte, Bech32 P2WPKH, P2SH-wrapped
//! P2WPKH and the two-byte-prefix Zcash transparent address.

use bech32::{u5, ToBase32, Variant};
use bitcoin::base58;
use bitcoin::secp256k1::PublicKey;
use tssrecover_core::SecretScalar;
use zeroize::Zeroizing;

use crate::hash::hash160;
use crate::ChainError;

pub const BITCOIN_P2PKH: u8 = 0x00;
pub const BITCOIN_P2SH: u8 = 0x05;
pub const DOGECOIN_P2PKH: u8 = 0x1E;
pub const DASH_P2PKH: u8 = 0x4C;
/// Zcash transparent P2PKH prefix, `t1...`
pub const ZCASH_P2PKH: [u8; 2] = [0x1C, 0xB8];
pub const WIF_VERSION: u8 = 0x80;

/// Parse a secp256k1 key (33-byte compressed or 65-byte uncompressed).
pub(crate) fn secp256k1_key(public_key: &[u8]) -> Result<PublicKey, ChainError> {
    PublicKey::from_slice(public_key).map_err(|e| ChainError::InvalidPublicKey(e.to_string()))
}

/// HASH160 of the compressed form of `public_key`.
pub fn pubkey_hash(public_key: &[u8]) -> Result<[u8; 20], ChainError> {
    let key = secp256k1_key(public_key)?;
    Ok(hash160(&key.serialize()))
}

/// Base58Check of `prefix || payload`.
pub fn base58check(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    base58::encode_check(&data)
}

/// Legacy pay-to-pubkey-hash address.
pub fn p2pkh(public_key: &[u8], version: u8) -> Result<String, ChainError> {
    Ok(base58check(&[version], &pubkey_hash(public_key)?))
}

/// Native SegWit v0 pay-to-witness-pubkey-hash address.
pub fn p2wpkh(public_key: &[u8], hrp: &str) -> Result<String, ChainError> {
    let program = pubkey_hash(public_key)?;
    let mut data = vec![u5::try_from_u8(0).map_err(|e| ChainError::Encoding(e.to_string()))?];
    data.extend(program.to_base32());
    bech32::encode(hrp, data, Variant::Bech32).map_err(|e| ChainError::Encoding(e.to_string()))
}

/// P2WPKH nested in P2SH: HASH160 of the `0x00 0x14 <pkh>` witness script.
pub fn p2sh_p2wpkh(public_key: &[u8]) -> Result<String, ChainError> {
    let mut redeem_script = Vec::with_capacity(22);
    redeem_script.extend_from_slice(&[0x00, 0x14]);
    redeem_script.extend_from_slice(&pubkey_hash(public_key)?);
    Ok(base58check(&[BITCOIN_P2SH], &hash160(&redeem_script)))
}

/// Zcash transparent address.
pub fn zcash_transparent(public_key: &[u8]) -> Result<String, ChainError> {
    Ok(base58check(&ZCASH_P2PKH, &pubkey_hash(public_key)?))
}

/// Wallet Import Format: `0x80 || scalar || [0x01]`, Base58Check.
pub fn encode_wif(secret: &SecretScalar, compressed: bool) -> Zeroizing<String> {
    let mut payload = Zeroizing::new(Vec::with_capacity(34));
    payload.push(WIF_VERSION);
    payload.extend_from_slice(secret.as_be_bytes());
    if compressed {
        payload.push(0x01);
    }
    Zeroizing::new(base58::encode_check(&payload))
}
