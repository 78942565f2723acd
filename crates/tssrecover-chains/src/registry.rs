//! The static chain registry
//!
//! One entry per supported chain, fixed at compile time. Every EVM chain uses
//! the Ethereum derivation path so they all resolve to one address.

use serde::{Deserialize, Serialize};
use tssrecover_core::{DerivationPath, KeyError, KeyType};

use crate::btc::{self, BITCOIN_P2PKH, DASH_P2PKH, DOGECOIN_P2PKH};
use crate::cashaddr::bitcoin_cash;
use crate::cosmos::{cosmos_address, COSMOS_HUB_HRP, MAYACHAIN_HRP, THORCHAIN_HRP};
use crate::ed25519::{solana_address, sui_address};
use crate::evm::evm_address;
use crate::ChainError;

/// Encoder signature shared by every registry entry.
pub type EncodeFn = fn(&[u8]) -> Result<String, ChainError>;

/// Which encoding family an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// Base58Check / Bech32 UTXO chains
    Utxo,
    CashAddr,
    Evm,
    Cosmos,
    Solana,
    Sui,
}

#[derive(Debug, Clone, Copy)]
pub struct ChainAddressSpec {
    pub name: &'static str,
    pub ticker: &'static str,
    pub coin_type: u32,
    pub default_path: &'static str,
    pub key_type: KeyType,
    pub family: AddressFamily,
    pub encode: EncodeFn,
}

impl ChainAddressSpec {
    /// Encode `public_key` with this chain's address format.
    pub fn encode_address(&self, public_key: &[u8]) -> Result<String, ChainError> {
        (self.encode)(public_key)
    }

    /// Parsed default path. Registry paths are constants, so this only
    /// fails if an entry is malformed.
    pub fn derivation_path(&self) -> Result<DerivationPath, KeyError> {
        self.default_path.parse()
    }

    /// Fail with `UnsupportedKeyType` unless this chain uses `key_type`.
    pub fn ensure_key_type(&self, key_type: KeyType) -> Result<(), ChainError> {
        if self.key_type != key_type {
            return Err(ChainError::UnsupportedKeyType {
                chain: self.name.to_string(),
                key_type,
            });
        }
        Ok(())
    }

    /// Whether a WIF private key is meaningful for this chain.
    pub fn wif_capable(&self) -> bool {
        matches!(self.family, AddressFamily::Utxo | AddressFamily::CashAddr)
    }
}

/// A chain address produced from a public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub chain: String,
    pub ticker: String,
    pub address: String,
    pub derive_path: String,
}

/// Encode `public_key` for `chain`. `derive_path` is recorded as given.
pub fn encode(
    chain: &ChainAddressSpec,
    public_key: &[u8],
    derive_path: &str,
) -> Result<DerivedAddress, ChainError> {
    Ok(DerivedAddress {
        chain: chain.name.to_string(),
        ticker: chain.ticker.to_string(),
        address: chain.encode_address(public_key)?,
        derive_path: derive_path.to_string(),
    })
}

fn bitcoin_p2wpkh(pk: &[u8]) -> Result<String, ChainError> {
    btc::p2wpkh(pk, "bc")
}

fn bitcoin_p2pkh(pk: &[u8]) -> Result<String, ChainError> {
    btc::p2pkh(pk, BITCOIN_P2PKH)
}

fn litecoin_p2wpkh(pk: &[u8]) -> Result<String, ChainError> {
    btc::p2wpkh(pk, "ltc")
}

fn dogecoin_p2pkh(pk: &[u8]) -> Result<String, ChainError> {
    btc::p2pkh(pk, DOGECOIN_P2PKH)
}

fn dash_p2pkh(pk: &[u8]) -> Result<String, ChainError> {
    btc::p2pkh(pk, DASH_P2PKH)
}

fn thorchain(pk: &[u8]) -> Result<String, ChainError> {
    cosmos_address(pk, THORCHAIN_HRP)
}

fn mayachain(pk: &[u8]) -> Result<String, ChainError> {
    cosmos_address(pk, MAYACHAIN_HRP)
}

fn cosmos_hub(pk: &[u8]) -> Result<String, ChainError> {
    cosmos_address(pk, COSMOS_HUB_HRP)
}

const ETH_PATH: &str = "m/44'/60'/0'/0/0";

const fn evm(name: &'static str, ticker: &'static str) -> ChainAddressSpec {
    ChainAddressSpec {
        name,
        ticker,
        coin_type: 60,
        default_path: ETH_PATH,
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Evm,
        encode: evm_address,
    }
}

pub static REGISTRY: &[ChainAddressSpec] = &[
    ChainAddressSpec {
        name: "Bitcoin",
        ticker: "BTC",
        coin_type: 0,
        default_path: "m/84'/0'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Utxo,
        encode: bitcoin_p2wpkh,
    },
    ChainAddressSpec {
        name: "Bitcoin-Legacy",
        ticker: "BTC",
        coin_type: 0,
        default_path: "m/44'/0'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Utxo,
        encode: bitcoin_p2pkh,
    },
    ChainAddressSpec {
        name: "Bitcoin-NestedSegwit",
        ticker: "BTC",
        coin_type: 0,
        default_path: "m/49'/0'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Utxo,
        encode: btc::p2sh_p2wpkh,
    },
    ChainAddressSpec {
        name: "Litecoin",
        ticker: "LTC",
        coin_type: 2,
        default_path: "m/84'/2'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Utxo,
        encode: litecoin_p2wpkh,
    },
    ChainAddressSpec {
        name: "Dogecoin",
        ticker: "DOGE",
        coin_type: 3,
        default_path: "m/44'/3'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Utxo,
        encode: dogecoin_p2pkh,
    },
    ChainAddressSpec {
        name: "Dash",
        ticker: "DASH",
        coin_type: 5,
        default_path: "m/44'/5'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Utxo,
        encode: dash_p2pkh,
    },
    ChainAddressSpec {
        name: "BitcoinCash",
        ticker: "BCH",
        coin_type: 145,
        default_path: "m/44'/145'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::CashAddr,
        encode: bitcoin_cash,
    },
    ChainAddressSpec {
        name: "Zcash",
        ticker: "ZEC",
        coin_type: 133,
        default_path: "m/44'/133'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Utxo,
        encode: btc::zcash_transparent,
    },
    evm("Ethereum", "ETH"),
    evm("BSC", "BNB"),
    evm("Polygon", "POL"),
    evm("Avalanche", "AVAX"),
    evm("Arbitrum", "ETH"),
    evm("Optimism", "ETH"),
    evm("Base", "ETH"),
    evm("Blast", "ETH"),
    evm("Zksync", "ETH"),
    evm("CronosChain", "CRO"),
    ChainAddressSpec {
        name: "THORChain",
        ticker: "RUNE",
        coin_type: 931,
        default_path: "m/44'/931'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Cosmos,
        encode: thorchain,
    },
    ChainAddressSpec {
        name: "MayaChain",
        ticker: "CACAO",
        coin_type: 931,
        default_path: "m/44'/931'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Cosmos,
        encode: mayachain,
    },
    ChainAddressSpec {
        name: "Cosmos",
        ticker: "ATOM",
        coin_type: 118,
        default_path: "m/44'/118'/0'/0/0",
        key_type: KeyType::Ecdsa,
        family: AddressFamily::Cosmos,
        encode: cosmos_hub,
    },
    ChainAddressSpec {
        name: "Solana",
        ticker: "SOL",
        coin_type: 501,
        default_path: "m",
        key_type: KeyType::Eddsa,
        family: AddressFamily::Solana,
        encode: solana_address,
    },
    ChainAddressSpec {
        name: "Sui",
        ticker: "SUI",
        coin_type: 784,
        default_path: "m",
        key_type: KeyType::Eddsa,
        family: AddressFamily::Sui,
        encode: sui_address,
    },
];

/// Every registry entry, in registry order.
pub fn all() -> &'static [ChainAddressSpec] {
    REGISTRY
}

/// Find a chain by name (case-insensitive) or by a ticker only one entry uses.
pub fn lookup(name: &str) -> Result<&'static ChainAddressSpec, ChainError> {
    let wanted = name.trim();
    if let Some(spec) = REGISTRY.iter().find(|s| s.name.eq_ignore_ascii_case(wanted)) {
        return Ok(spec);
    }

    let mut by_ticker = REGISTRY
        .iter()
        .filter(|s| s.ticker.eq_ignore_ascii_case(wanted));
    match (by_ticker.next(), by_ticker.next()) {
        (Some(spec), None) => Ok(spec),
        (Some(_), Some(_)) => Err(ChainError::UnsupportedChain(format!(
            "{} (ticker is shared by several chains; use the chain name)",
            wanted
        ))),
        _ => Err(ChainError::UnsupportedChain(wanted.to_string())),
    }
}

/// Entries for one key type, in registry order.
pub fn for_key_type(key_type: KeyType) -> impl Iterator<Item = &'static ChainAddressSpec> {
    REGISTRY.iter().filter(move |s| s.key_type == key_type)
}

/// Resolve a user selection. An empty selection means every chain.
/// Duplicates are dropped, first occurrence wins.
pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static ChainAddressSpec>, ChainError> {
    if names.is_empty() {
        return Ok(REGISTRY.iter().collect());
    }
    let mut selected: Vec<&'static ChainAddressSpec> = Vec::with_capacity(names.len());
    for name in names {
        let spec = lookup(name.as_ref())?;
        if !selected.iter().any(|s| s.name == spec.name) {
            selected.push(spec);
        }
    }
    Ok(selected)
}
