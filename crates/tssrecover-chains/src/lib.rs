//! tssrecover chain address encoders
//!
//! Pure functions from a public key to a chain-specific address string, plus
//! the static [`registry`] that ties each supported chain to its coin type,
//! default derivation path, key type and encoder.
//!
//! | Family | Encoders |
//! |---|---|
//! | UTXO | [`btc::p2pkh`], [`btc::p2wpkh`], [`btc::p2sh_p2wpkh`], [`btc::zcash_transparent`] |
//! | Bitcoin Cash | [`cashaddr::bitcoin_cash`] |
//! | EVM | [`evm::evm_address`] |
//! | Cosmos SDK | [`cosmos::cosmos_address`] |
//! | Ed25519 | [`ed25519::solana_address`], [`ed25519::sui_address`] |

pub mod btc;
pub mod cashaddr;
pub mod cosmos;
pub mod ed25519;
pub mod evm;
pub mod hash;
pub mod registry;

pub use btc::encode_wif;
pub use registry::{
    encode, for_key_type, lookup, select, AddressFamily, ChainAddressSpec, DerivedAddress,
    REGISTRY,
};

use thiserror::Error;
use tssrecover_core::KeyType;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),
    #[error("{chain} does not use {key_type} keys")]
    UnsupportedKeyType { chain: String, key_type: KeyType },
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Address encoding failed: {0}")]
    Encoding(String),
}
