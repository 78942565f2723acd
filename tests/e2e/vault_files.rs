//! Recovery from vault files on disk, plain and password protected.

mod common;

use std::path::PathBuf;

use common::{key, vault_payloads, write_vaults};
use tempfile::TempDir;
use tssrecover_core::{
    read_shares, ChainCode, FixedPassword, KdfParams, KeyType, NoPassword, PasswordMap,
    PasswordSource, ReconstructedKey, ShareRecord, VaultError,
};
use tssrecover_recovery::{enforce, recover, validate, ValidationPolicy};

fn read_all(paths: &[PathBuf], passwords: &dyn PasswordSource) -> Vec<ShareRecord> {
    paths
        .iter()
        .flat_map(|p| read_shares(p, passwords).unwrap())
        .collect()
}

fn fixture_keys() -> (ReconstructedKey, ReconstructedKey) {
    let cc = ChainCode([0x7e; 32]);
    (key(KeyType::Ecdsa, 0x1234_5678, cc), key(KeyType::Eddsa, 0x9abc_def0, cc))
}

#[test]
fn test_unencrypted_vault_files() {
    let dir = TempDir::new().unwrap();
    let (ecdsa, eddsa) = fixture_keys();
    let paths = write_vaults(
        dir.path(),
        &vault_payloads(&[&ecdsa, &eddsa], 2, 3, 1),
        None,
        KdfParams::Sha256,
    );

    let shares = read_all(&paths[..2], &NoPassword);
    assert_eq!(shares.len(), 4);
    assert_eq!(shares[0].party_id, "party-1");

    let set = recover(&shares, 2).unwrap();
    assert_eq!(set.keys[&KeyType::Ecdsa].scalar, ecdsa.scalar);
    assert_eq!(set.keys[&KeyType::Eddsa].scalar, eddsa.scalar);

    let results = validate(&set.addresses(), &set.declared);
    enforce(&results, ValidationPolicy::Abort).unwrap();
}

#[test]
fn test_encrypted_vault_files() {
    let dir = TempDir::new().unwrap();
    let (ecdsa, eddsa) = fixture_keys();
    let paths = write_vaults(
        dir.path(),
        &vault_payloads(&[&ecdsa, &eddsa], 2, 2, 2),
        Some("correct horse"),
        KdfParams::Sha256,
    );

    let shares = read_all(&paths, &FixedPassword::new("correct horse"));
    let set = recover(&shares, 2).unwrap();
    assert!(set.root_matches_declared(KeyType::Ecdsa));
    assert!(set.root_matches_declared(KeyType::Eddsa));
}

#[test]
fn test_argon2id_vault_file() {
    let dir = TempDir::new().unwrap();
    let (ecdsa, _) = fixture_keys();
    let paths = write_vaults(
        dir.path(),
        &vault_payloads(&[&ecdsa], 1, 1, 3),
        Some("argon"),
        KdfParams::argon2id(),
    );

    let shares = read_shares(&paths[0], &FixedPassword::new("argon")).unwrap();
    let set = recover(&shares, 1).unwrap();
    assert_eq!(set.keys[&KeyType::Ecdsa].scalar, ecdsa.scalar);
}

#[test]
fn test_per_vault_passwords() {
    let dir = TempDir::new().unwrap();
    let (ecdsa, _) = fixture_keys();
    let payloads = vault_payloads(&[&ecdsa], 2, 2, 4);

    let first = write_vaults(dir.path(), &payloads[..1], Some("alpha"), KdfParams::Sha256);
    let sub = dir.path().join("other");
    std::fs::create_dir(&sub).unwrap();
    let second = write_vaults(&sub, &payloads[1..], Some("beta"), KdfParams::Sha256);

    let mut passwords = PasswordMap::new();
    passwords.insert(first[0].display().to_string(), "alpha");
    passwords.insert(second[0].display().to_string(), "beta");

    let mut shares = read_shares(&first[0], &passwords).unwrap();
    shares.extend(read_shares(&second[0], &passwords).unwrap());
    let set = recover(&shares, 2).unwrap();
    assert_eq!(set.keys[&KeyType::Ecdsa].scalar, ecdsa.scalar);
}

#[test]
fn test_wrong_password() {
    let dir = TempDir::new().unwrap();
    let (ecdsa, _) = fixture_keys();
    let paths = write_vaults(
        dir.path(),
        &vault_payloads(&[&ecdsa], 1, 1, 5),
        Some("right"),
        KdfParams::Sha256,
    );

    assert!(matches!(
        read_shares(&paths[0], &FixedPassword::new("wrong")),
        Err(VaultError::DecryptionFailed(_))
    ));
}

#[test]
fn test_missing_password() {
    let dir = TempDir::new().unwrap();
    let (ecdsa, _) = fixture_keys();
    let paths = write_vaults(
        dir.path(),
        &vault_payloads(&[&ecdsa], 1, 1, 6),
        Some("secret"),
        KdfParams::Sha256,
    );

    match read_shares(&paths[0], &NoPassword) {
        Err(VaultError::PasswordRequired { vault }) => {
            assert!(vault.ends_with("party-1.vult"));
        }
        other => panic!("expected PasswordRequired, got {:?}", other),
    }
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        read_shares(dir.path().join("absent.vult"), &NoPassword),
        Err(VaultError::Io { .. })
    ));
}

#[test]
fn test_payload_without_key_shares() {
    let dir = TempDir::new().unwrap();
    let (ecdsa, _) = fixture_keys();
    let mut payloads = vault_payloads(&[&ecdsa], 1, 1, 7);
    payloads[0].key_shares.clear();
    let paths = write_vaults(dir.path(), &payloads, None, KdfParams::Sha256);

    assert!(matches!(
        read_shares(&paths[0], &NoPassword),
        Err(VaultError::InvalidFormat(_))
    ));
}
