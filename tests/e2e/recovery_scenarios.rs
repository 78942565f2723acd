//! End-to-end recovery scenarios.
//!
//! Each test builds a vault set by splitting a known key, flattens the
//! payloads into share records the way the reader does, and runs the full
//! recover + validate pipeline.

mod common;

use std::collections::BTreeMap;

use common::{key, vault_payloads, ED_BASEPOINT, GENERATOR};
use tssrecover_chains::{encode_wif, registry, select};
use tssrecover_core::{ChainCode, DerivationPath, KeyType, ShareRecord, VaultPayload};
use tssrecover_recovery::{
    derive_addresses, enforce, recover, recover_with, validate, RecoveryError, ValidationError,
    ValidationPolicy,
};
use tssrecover_shamir::ShamirError;

fn records(payloads: &[VaultPayload]) -> Vec<ShareRecord> {
    payloads
        .iter()
        .flat_map(|p| p.share_records().unwrap())
        .collect()
}

/// Private key 1 under an all-zero chain code on both curves.
fn unit_vaults(threshold: usize, total: usize, seed: u64) -> Vec<VaultPayload> {
    let cc = ChainCode([0u8; 32]);
    vault_payloads(
        &[&key(KeyType::Ecdsa, 1, cc), &key(KeyType::Eddsa, 1, cc)],
        threshold,
        total,
        seed,
    )
}

// ============================================================================
// Known vectors
// ============================================================================

#[test]
fn test_bitcoin_known_vector() {
    let vaults = unit_vaults(2, 3, 1);
    let set = recover(&records(&vaults[..2]), 2).unwrap();

    let root = &set.keys[&KeyType::Ecdsa];
    assert_eq!(hex::encode(root.public_key().unwrap()), GENERATOR);
    assert_eq!(
        encode_wif(&root.scalar, true).as_str(),
        "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
    );
    assert!(set.root_matches_declared(KeyType::Ecdsa));

    let btc = set.chain("Bitcoin").unwrap();
    assert_eq!(btc.address.address, "bc1qs8m8tzfhf0sg3k50fgsp6dr9xmqfcxrlsvukcn");
    assert_eq!(btc.address.derive_path, "m/84/0/0/0/0");
    assert_eq!(
        hex::encode(&btc.public_key),
        "02f023044a2f4dc231b2ed4416f4f925403fe4c96015fa30feee46438f82aaf025"
    );

    assert_eq!(
        set.chain("Bitcoin-Legacy").unwrap().address.address,
        "1EKNPvc2YRcsBmRxd3zna1DK84aquPSCrj"
    );
    assert_eq!(
        set.chain("BitcoinCash").unwrap().address.address,
        "bitcoincash:qzzr5ts7745g24v6jqxkl73wctcqefayqq6g3g7w6y"
    );
    assert_eq!(
        set.chain("THORChain").unwrap().address.address,
        "thor1zxytxz7mtujdwkfzvchmasrkhup7k36wsexnm4"
    );
}

#[test]
fn test_eddsa_known_vector() {
    let set = recover(&records(&unit_vaults(2, 2, 2)), 2).unwrap();

    let root = &set.keys[&KeyType::Eddsa];
    assert_eq!(hex::encode(root.public_key().unwrap()), ED_BASEPOINT);

    let sol = set.chain("Solana").unwrap();
    assert_eq!(sol.address.address, "6x5SYnLroiN7WYq8NQYU9KHcH4YjpBbwpUfVu3EB7ieH");
    assert_eq!(sol.address.derive_path, "m");
    assert_eq!(
        set.chain("Sui").unwrap().address.address,
        "0xcce68d7d70c518c577f9af7c12bcd545279ad66704e268746641ad0703e9f84f"
    );
}

#[test]
fn test_evm_sharing() {
    let set = recover(&records(&unit_vaults(2, 3, 3)), 2).unwrap();
    let evm: Vec<_> = registry::all()
        .iter()
        .filter(|c| c.coin_type == 60)
        .map(|c| set.chain(c.name).unwrap())
        .collect();

    assert_eq!(evm.len(), 10);
    for chain in &evm {
        assert_eq!(
            chain.address.address,
            "0x48010bfc5b85886182a150a15aa29c10c2f2751c"
        );
        assert_eq!(chain.private_key, evm[0].private_key);
        assert_eq!(chain.address.derive_path, "m/44/60/0/0/0");
    }
}

// ============================================================================
// Threshold behaviour
// ============================================================================

#[test]
fn test_threshold_invariance() {
    let cc = ChainCode([0x5a; 32]);
    let vaults = vault_payloads(
        &[
            &key(KeyType::Ecdsa, 0xdead_beef, cc),
            &key(KeyType::Eddsa, 0xfeed_f00d, cc),
        ],
        3,
        5,
        4,
    );

    let subsets: [&[usize]; 4] = [&[0, 1, 2], &[1, 3, 4], &[4, 2, 0, 3], &[0, 1, 2, 3, 4]];
    let sets: Vec<_> = subsets
        .iter()
        .map(|idx| {
            let chosen: Vec<VaultPayload> = idx.iter().map(|&i| vaults[i].clone()).collect();
            recover(&records(&chosen), 3).unwrap()
        })
        .collect();

    for set in &sets[1..] {
        for key_type in KeyType::ALL {
            assert_eq!(set.keys[&key_type].scalar, sets[0].keys[&key_type].scalar);
        }
        assert_eq!(set.addresses(), sets[0].addresses());
    }
    assert!(sets[0].root_matches_declared(KeyType::Ecdsa));
    assert!(sets[0].root_matches_declared(KeyType::Eddsa));
}

#[test]
fn test_insufficient_shares() {
    let vaults = unit_vaults(2, 3, 5);
    let err = recover(&records(&vaults[..1]), 2).unwrap_err();
    assert!(matches!(
        err,
        RecoveryError::InsufficientShares {
            key_type: Some(KeyType::Ecdsa),
            have: 1,
            need: 2
        }
    ));
}

#[test]
fn test_below_threshold_gives_wrong_key() {
    // Two shares of a 3-of-3 split interpolate to some other key entirely;
    // the validator is what catches this when the caller understates the threshold.
    let vaults = unit_vaults(3, 3, 6);
    let set = recover(&records(&vaults[..2]), 2).unwrap();
    assert!(!set.root_matches_declared(KeyType::Ecdsa));

    let results = validate(&set.addresses(), &set.declared);
    assert!(results.iter().all(|r| !r.passed));
    assert!(matches!(
        enforce(&results, ValidationPolicy::Abort),
        Err(RecoveryError::ValidationFailed { .. })
    ));
}

#[test]
fn test_incompatible_vault_sets() {
    let cc = ChainCode([0u8; 32]);
    let a = vault_payloads(&[&key(KeyType::Ecdsa, 11, cc)], 2, 2, 7);
    let b = vault_payloads(&[&key(KeyType::Ecdsa, 12, cc)], 2, 2, 8);

    let err = recover(&records(&[a[0].clone(), b[1].clone()]), 2).unwrap_err();
    match err {
        RecoveryError::IncompatibleShares {
            key_type,
            field,
            party,
        } => {
            assert_eq!(key_type, KeyType::Ecdsa);
            assert_eq!(field, "declared_public_key");
            assert_eq!(party, "party-2");
        }
        other => panic!("expected IncompatibleShares, got {:?}", other),
    }
}

#[test]
fn test_mismatched_chain_codes() {
    let a = vault_payloads(&[&key(KeyType::Ecdsa, 11, ChainCode([1; 32]))], 2, 2, 9);
    let mut b = a[1].clone();
    b.hex_chain_code = ChainCode([2; 32]).to_string();

    assert!(matches!(
        recover(&records(&[a[0].clone(), b]), 2),
        Err(RecoveryError::IncompatibleShares {
            field: "chain_code",
            ..
        })
    ));
}

#[test]
fn test_duplicate_share_ids() {
    let vaults = unit_vaults(2, 3, 10);
    let twice = vec![vaults[0].clone(), vaults[0].clone()];
    assert!(matches!(
        recover(&records(&twice), 2),
        Err(RecoveryError::Shamir(ShamirError::DuplicateShareId(_)))
    ));
}

#[test]
fn test_degenerate_key() {
    // y = 5x passes through the origin, so the interpolated secret is zero
    let cc = ChainCode([0u8; 32]);
    let mut vaults = vault_payloads(&[&key(KeyType::Ecdsa, 3, cc)], 2, 2, 11);
    vaults[0].key_shares[0].share_id = "1".into();
    vaults[0].key_shares[0].xi = "5".into();
    vaults[1].key_shares[0].share_id = "2".into();
    vaults[1].key_shares[0].xi = "10".into();

    assert!(matches!(
        recover(&records(&vaults), 2),
        Err(RecoveryError::Shamir(ShamirError::DegenerateKey))
    ));
}

// ============================================================================
// Derivation paths
// ============================================================================

#[test]
fn test_hardened_markers_are_stripped() {
    let marked: DerivationPath = "m/84'/0'/0'/0/0".parse().unwrap();
    let plain: DerivationPath = "m/84/0/0/0/0".parse().unwrap();
    let h_style: DerivationPath = "m/84h/0H/0h/0/0".parse().unwrap();

    assert!(marked.had_hardened_markers());
    assert!(!plain.had_hardened_markers());
    assert_eq!(marked.indices(), plain.indices());
    assert_eq!(h_style.indices(), plain.indices());
    assert!(marked.non_hardened());
    assert_eq!(marked.to_string(), "m/84/0/0/0/0");

    // Every registry path carries markers; recovery derives them non-hardened
    let set = recover(&records(&unit_vaults(2, 2, 12)), 2).unwrap();
    assert_eq!(set.chain("Bitcoin").unwrap().address.derive_path, plain.to_string());
}

#[test]
fn test_invalid_paths_rejected() {
    for bad in ["", "84/0", "m/", "m//0", "m/x", "m/2147483648", "m/-1"] {
        assert!(bad.parse::<DerivationPath>().is_err(), "{:?} parsed", bad);
    }
    assert!("m".parse::<DerivationPath>().unwrap().is_root());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_round_trip_validation() {
    let cc = ChainCode([0x42; 32]);
    let vaults = vault_payloads(
        &[&key(KeyType::Ecdsa, 777, cc), &key(KeyType::Eddsa, 888, cc)],
        2,
        3,
        13,
    );
    let set = recover(&records(&vaults[1..]), 2).unwrap();
    let results = validate(&set.addresses(), &set.declared);

    assert_eq!(results.len(), registry::all().len());
    assert!(results.iter().all(|r| r.passed), "{:?}", results);
    enforce(&results, ValidationPolicy::Abort).unwrap();

    // The public-only listing agrees with the private recovery
    for key_type in KeyType::ALL {
        let listed = derive_addresses(&set.declared[&key_type], &[]).unwrap();
        for address in listed {
            assert_eq!(set.chain(&address.chain).unwrap().address, address);
        }
    }
}

#[test]
fn test_validation_catches_wrong_declared_key() {
    let set = recover(&records(&unit_vaults(2, 2, 14)), 2).unwrap();

    let mut declared: BTreeMap<_, _> = set.declared.clone();
    let ecdsa = declared.get_mut(&KeyType::Ecdsa).unwrap();
    // 2·G
    ecdsa.public_key =
        hex::decode("02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5").unwrap();

    let results = validate(&set.addresses(), &declared);
    assert_eq!(results.len(), registry::all().len());
    for result in &results {
        let spec = tssrecover_chains::lookup(&result.chain).unwrap();
        match spec.key_type {
            KeyType::Ecdsa => {
                assert!(!result.passed);
                assert!(matches!(
                    result.error,
                    Some(ValidationError::AddressMismatch { .. })
                ));
            }
            KeyType::Eddsa => assert!(result.passed),
        }
    }

    enforce(&results, ValidationPolicy::Warn).unwrap();
    match enforce(&results, ValidationPolicy::Abort) {
        Err(RecoveryError::ValidationFailed { chains }) => {
            assert_eq!(chains.len(), registry::for_key_type(KeyType::Ecdsa).count());
            assert!(!chains.contains(&"Solana".to_string()));
        }
        other => panic!("expected ValidationFailed, got {:?}", other),
    }
}

#[test]
fn test_chain_selection() {
    let chains = select(&["Litecoin", "DOGE", "Sui"]).unwrap();
    let set = recover_with(&records(&unit_vaults(2, 2, 15)), 2, &chains).unwrap();

    assert_eq!(set.chains.len(), 3);
    assert!(set.chains[0].address.address.starts_with("ltc1q"));
    assert!(set.chains[1].address.address.starts_with('D'));
    assert!(set.chains[2].address.address.starts_with("0x"));

    assert!(select(&["ETH"]).is_err());
    assert!(select(&["Monero"]).is_err());
}

#[test]
fn test_ecdsa_only_vaults() {
    let cc = ChainCode([0u8; 32]);
    let vaults = vault_payloads(&[&key(KeyType::Ecdsa, 1, cc)], 2, 2, 16);
    let set = recover(&records(&vaults), 2).unwrap();

    assert!(set.keys.get(&KeyType::Eddsa).is_none());
    assert_eq!(set.chains.len(), registry::for_key_type(KeyType::Ecdsa).count());
    assert!(set.chain("Solana").is_none());
}
