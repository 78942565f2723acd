//! Bitcoin Cash CashAddr encoding
//!
//! Payload is `version byte || hash160`, regrouped into 5-bit words. The
//! checksum is a 40-bit BCH code over the HRP (low 5 bits of each char), a
//! zero separator, the payload words and eight zero words.

use bech32::{u5, ToBase32};

use crate::btc::pubkey_hash;
use crate::ChainError;

pub const BITCOIN_CASH_HRP: &str = "bitcoincash";

const GENERATORS: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

/// P2PKH, 160-bit hash
const VERSION_P2PKH_160: u8 = 0x00;

fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if (c0 >> i) & 1 == 1 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

/// Encode a 20-byte hash as a CashAddr string including the `hrp:` prefix.
pub fn encode(hrp: &str, version: u8, hash: &[u8; 20]) -> Result<String, ChainError> {
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(hash);
    let words = payload.to_base32();

    let mut checksum_input: Vec<u8> = hrp.bytes().map(|b| b & 0x1f).collect();
    checksum_input.push(0);
    checksum_input.extend(words.iter().map(|w| w.to_u8()));
    checksum_input.extend_from_slice(&[0u8; 8]);
    let checksum = polymod(&checksum_input);

    let mut address = String::with_capacity(hrp.len() + 1 + words.len() + 8);
    address.push_str(hrp);
    address.push(':');
    address.extend(words.iter().map(|w| w.to_char()));
    for i in 0..8 {
        let w = u5::try_from_u8(((checksum >> (5 * (7 - i))) & 0x1f) as u8)
            .map_err(|e| ChainError::Encoding(e.to_string()))?;
        address.push(w.to_char());
    }
    Ok(address)
}

/// Bitcoin Cash P2PKH CashAddr for a secp256k1 public key.
pub fn bitcoin_cash(public_key: &[u8]) -> Result<String, ChainError> {
    encode(BITCOIN_CASH_HRP, VERSION_P2PKH_160, &pubkey_hash(public_key)?)
}
