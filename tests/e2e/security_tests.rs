//! Security-specific tests.
//!
//! These tests verify:
//! 1. Secret material never reaches `Debug` output
//! 2. Malformed or tampered containers fail cleanly instead of panicking
//! 3. Share metadata is policed before any interpolation
//! 4. Untrusted strings (paths, public keys) are rejected, not trusted

mod common;

use base64::{engine::general_purpose::STANDARD, Engine};
use common::{key, vault_payloads, GENERATOR};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tssrecover_chains::{lookup, registry};
use tssrecover_core::{
    parse_container, seal_container, ChainCode, CryptoError, DerivationPath, FixedPassword,
    KdfParams, KeyType, NoPassword, SecretScalar, VaultContainer, VaultError,
};
use tssrecover_recovery::recover;

// ============================================================================
// 1. Redaction
// ============================================================================

#[test]
fn test_debug_output_is_redacted() {
    let cc = ChainCode([0u8; 32]);
    let payloads = vault_payloads(&[&key(KeyType::Ecdsa, 0xabcdef, cc)], 2, 2, 1);
    let shares: Vec<_> = payloads
        .iter()
        .flat_map(|p| p.share_records().unwrap())
        .collect();

    for (payload, share) in payloads.iter().zip(&shares) {
        let xi = &payload.key_shares[0].xi;
        assert!(!format!("{:?}", payload).contains(xi.as_str()));
        assert!(!format!("{:?}", share).contains(&share.secret_share.to_biguint().to_string()));
        assert!(format!("{:?}", share).contains("REDACTED"));
    }

    let set = recover(&shares, 2).unwrap();
    let root = &set.keys[&KeyType::Ecdsa];
    let root_hex = root.scalar.to_hex();
    assert!(!format!("{:?}", root).contains(root_hex.as_str()));

    let btc = set.chain("Bitcoin").unwrap();
    let child_hex = btc.private_key.to_hex();
    assert!(!format!("{:?}", btc).contains(child_hex.as_str()));
    assert!(!format!("{:?}", set).contains(child_hex.as_str()));
}

#[test]
fn test_secret_scalar_equality_ignores_debug() {
    let a = SecretScalar::from_be_bytes([7u8; 32]);
    let b = SecretScalar::from_be_bytes([7u8; 32]);
    assert_eq!(a, b);
    assert_eq!(format!("{:?}", a), "SecretScalar([REDACTED])");
}

// ============================================================================
// 2. Malformed containers
// ============================================================================

#[test]
fn test_random_containers_never_panic() {
    let mut rng = StdRng::seed_from_u64(0xF00D);
    for _ in 0..500 {
        let len = rng.gen_range(0..256);
        let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

        let _ = parse_container(&String::from_utf8_lossy(&bytes), &NoPassword, "fuzz");
        let _ = parse_container(&STANDARD.encode(&bytes), &NoPassword, "fuzz");
    }
}

#[test]
fn test_garbage_envelope_json() {
    for json in [
        "{}",
        r#"{"version":1}"#,
        r#"{"version":1,"is_encrypted":false,"vault":"!!!"}"#,
        r#"{"version":1,"is_encrypted":false,"vault":"e30="}"#,
        r#"[1,2,3]"#,
    ] {
        let text = STANDARD.encode(json);
        assert!(parse_container(&text, &NoPassword, "garbage").is_err(), "{}", json);
    }
}

#[test]
fn test_future_version_rejected() {
    let container = VaultContainer {
        version: 99,
        is_encrypted: false,
        kdf: None,
        vault: STANDARD.encode("{}"),
    };
    let text = STANDARD.encode(serde_json::to_vec(&container).unwrap());
    assert!(matches!(
        parse_container(&text, &NoPassword, "future"),
        Err(VaultError::InvalidFormat(_))
    ));
}

fn tamper(text: &str, index_from_end: usize) -> String {
    let envelope = STANDARD.decode(text).unwrap();
    let mut container: VaultContainer = serde_json::from_slice(&envelope).unwrap();
    let mut sealed = STANDARD.decode(&container.vault).unwrap();
    let i = sealed.len() - 1 - index_from_end;
    sealed[i] ^= 0x01;
    container.vault = STANDARD.encode(&sealed);
    STANDARD.encode(serde_json::to_vec(&container).unwrap())
}

#[test]
fn test_tampered_ciphertext_fails() {
    let cc = ChainCode([0u8; 32]);
    let payloads = vault_payloads(&[&key(KeyType::Ecdsa, 5, cc)], 1, 1, 2);
    let text = seal_container(&payloads[0], Some("pw"), KdfParams::Sha256).unwrap();
    assert!(parse_container(&text, &FixedPassword::new("pw"), "ok").is_ok());

    // Last tag byte, then a byte inside the ciphertext body
    for offset in [0usize, 20] {
        assert!(matches!(
            parse_container(&tamper(&text, offset), &FixedPassword::new("pw"), "t"),
            Err(VaultError::DecryptionFailed(_))
        ));
    }
    // First nonce byte
    let envelope = STANDARD.decode(&text).unwrap();
    let container: VaultContainer = serde_json::from_slice(&envelope).unwrap();
    let sealed_len = STANDARD.decode(&container.vault).unwrap().len();
    assert!(matches!(
        parse_container(&tamper(&text, sealed_len - 1), &FixedPassword::new("pw"), "t"),
        Err(VaultError::DecryptionFailed(_))
    ));
}

#[test]
fn test_encrypted_flag_without_ciphertext() {
    let container = VaultContainer {
        version: 1,
        is_encrypted: true,
        kdf: None,
        vault: STANDARD.encode([1u8, 2, 3]),
    };
    let text = STANDARD.encode(serde_json::to_vec(&container).unwrap());
    assert!(parse_container(&text, &FixedPassword::new("pw"), "short").is_err());
}

#[test]
fn test_oversized_argon2_cost_rejected() {
    let cc = ChainCode([0u8; 32]);
    let payloads = vault_payloads(&[&key(KeyType::Ecdsa, 5, cc)], 1, 1, 5);
    let cheap = KdfParams::Argon2id {
        salt: hex::encode([3u8; 16]),
        m_cost: 1024,
        t_cost: 1,
        p_cost: 1,
    };
    let text = seal_container(&payloads[0], Some("pw"), cheap).unwrap();

    let envelope = STANDARD.decode(&text).unwrap();
    let mut container: VaultContainer = serde_json::from_slice(&envelope).unwrap();
    container.kdf = Some(KdfParams::Argon2id {
        salt: hex::encode([3u8; 16]),
        m_cost: u32::MAX,
        t_cost: 1,
        p_cost: 1,
    });
    let hostile = STANDARD.encode(serde_json::to_vec(&container).unwrap());

    assert!(matches!(
        parse_container(&hostile, &FixedPassword::new("pw"), "hostile"),
        Err(VaultError::DecryptionFailed(CryptoError::KeyDerivationFailed(_)))
    ));
}

// ============================================================================
// 3. Share policing
// ============================================================================

#[test]
fn test_share_fields_validated() {
    let cc = ChainCode([0u8; 32]);
    let base = vault_payloads(&[&key(KeyType::Ecdsa, 5, cc)], 1, 1, 3).remove(0);

    let mut zero_id = base.clone();
    zero_id.key_shares[0].share_id = "0".into();
    assert!(matches!(zero_id.share_records(), Err(VaultError::InvalidFormat(_))));

    let mut hex_xi = base.clone();
    hex_xi.key_shares[0].xi = "0xdeadbeef".into();
    assert!(matches!(hex_xi.share_records(), Err(VaultError::InvalidFormat(_))));

    let mut negative = base.clone();
    negative.key_shares[0].share_id = "-1".into();
    assert!(negative.share_records().is_err());

    let mut no_pubkey = base.clone();
    no_pubkey.public_key_ecdsa.clear();
    assert!(matches!(no_pubkey.share_records(), Err(VaultError::InvalidFormat(_))));

    let mut bad_chain_code = base;
    bad_chain_code.hex_chain_code = "abcd".into();
    assert!(bad_chain_code.share_records().is_err());
}

#[test]
fn test_oversized_share_value_rejected() {
    let cc = ChainCode([0u8; 32]);
    let mut payload = vault_payloads(&[&key(KeyType::Ecdsa, 5, cc)], 1, 1, 4).remove(0);
    // 2^256
    payload.key_shares[0].xi =
        "115792089237316195423570985008687907853269984665640564039457584007913129639936".into();
    assert!(payload.share_records().is_err());
}

// ============================================================================
// 4. Untrusted strings
// ============================================================================

#[test]
fn test_path_parser_rejects_hostile_input() {
    let long = format!("m{}", "/0".repeat(10_000));
    assert!(long.parse::<DerivationPath>().is_ok());

    for bad in [
        "m/99999999999999999999",
        "m/0/1/\u{0}",
        "m/１",
        "m/0''",
        "m/ 1",
        "/m/0",
    ] {
        assert!(bad.parse::<DerivationPath>().is_err(), "{:?}", bad);
    }
}

#[test]
fn test_encoders_reject_wrong_length_keys() {
    for spec in registry::all() {
        assert!(spec.encode_address(&[]).is_err(), "{}", spec.name);
        assert!(spec.encode_address(&[0x02; 20]).is_err(), "{}", spec.name);
    }

    // Valid length, bad prefix byte
    let mut bad = hex::decode(GENERATOR).unwrap();
    bad[0] = 0x05;
    for name in ["Bitcoin", "Ethereum", "Cosmos", "BitcoinCash"] {
        assert!(lookup(name).unwrap().encode_address(&bad).is_err(), "{}", name);
    }
}
