//! Threshold secret reconstruction over curve scalar fields.
//!
//! GG20 key shares are points `(share_id, Xi)` on a random polynomial whose
//! constant term is the private key. Any `t` of them pin the polynomial down.

use num_bigint::{BigUint, RandBigInt};
use num_traits::Zero;
use rand::Rng;
use tssrecover_core::{ReconstructedKey, SecretScalar, ShareRecord};

use crate::field::PrimeField;
use crate::ShamirError;

/// Interpolate `shares` at zero in `field` and return the secret scalar.
///
/// Every share is used. No threshold policing happens here beyond requiring
/// at least one share of a single key type.
pub fn reconstruct_secret(
    shares: &[ShareRecord],
    field: &PrimeField,
) -> Result<SecretScalar, ShamirError> {
    let first = shares.first().ok_or(ShamirError::NoShares)?;
    if let Some(other) = shares.iter().find(|s| s.key_type != first.key_type) {
        return Err(ShamirError::MixedKeyTypes(first.key_type, other.key_type));
    }

    let points: Vec<(BigUint, BigUint)> = shares
        .iter()
        .map(|s| (s.share_id.clone(), s.secret_share.to_biguint()))
        .collect();

    let secret = field.interpolate_at_zero(&points)?;
    if secret.is_zero() {
        return Err(ShamirError::DegenerateKey);
    }
    log::debug!(
        "Interpolated {} {} share(s)",
        shares.len(),
        first.key_type
    );
    Ok(SecretScalar::from_biguint(&secret)?)
}

/// Reconstruct with the field matching the shares' key type.
pub fn reconstruct(shares: &[ShareRecord]) -> Result<SecretScalar, ShamirError> {
    let key_type = shares.first().ok_or(ShamirError::NoShares)?.key_type;
    reconstruct_secret(shares, &PrimeField::for_key_type(key_type))
}

/// Check that more-than-threshold shares all lie on one polynomial.
///
/// Reconstructs from the first `threshold` and the last `threshold` shares and
/// compares. With exactly `threshold` shares there is nothing to compare and
/// the result is `true`.
pub fn verify_shares(shares: &[ShareRecord], threshold: usize) -> Result<bool, ShamirError> {
    if threshold == 0 {
        return Err(ShamirError::InvalidThreshold);
    }
    if shares.len() < threshold {
        return Err(ShamirError::ThresholdExceedsShares);
    }
    if shares.len() == threshold {
        return Ok(true);
    }

    let expected = reconstruct(&shares[..threshold])?;
    let result = reconstruct(&shares[shares.len() - threshold..])?;
    Ok(result == expected)
}

/// Deal `total` shares of `secret` with reconstruction threshold `threshold`.
///
/// Samples a random polynomial of degree `threshold - 1` whose constant term
/// is `secret` and evaluates it at x = 1..=total. Returns `(x, y)` pairs.
pub fn split_secret<R: Rng + ?Sized>(
    secret: &BigUint,
    threshold: usize,
    total: usize,
    field: &PrimeField,
    rng: &mut R,
) -> Result<Vec<(BigUint, BigUint)>, ShamirError> {
    if threshold == 0 {
        return Err(ShamirError::InvalidThreshold);
    }
    if threshold > total {
        return Err(ShamirError::ThresholdExceedsShares);
    }

    let mut coefficients = Vec::with_capacity(threshold);
    coefficients.push(field.reduce(secret));
    for _ in 1..threshold {
        coefficients.push(rng.gen_biguint_below(field.order()));
    }

    Ok((1..=total)
        .map(|i| {
            let x = BigUint::from(i);
            let y = field.eval_poly(&coefficients, &x);
            (x, y)
        })
        .collect())
}

/// Deal full [`ShareRecord`]s for `key`, one per simulated party.
///
/// Party ids are `party-1`..`party-N`; every record carries the key's chain
/// code and its public key as the declared committee key.
pub fn deal_shares<R: Rng + ?Sized>(
    key: &ReconstructedKey,
    threshold: usize,
    total: usize,
    rng: &mut R,
) -> Result<Vec<ShareRecord>, ShamirError> {
    let field = PrimeField::for_key_type(key.key_type);
    let declared_public_key = key.public_key()?;
    let points = split_secret(&key.scalar.to_biguint(), threshold, total, &field, rng)?;

    points
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| {
            Ok(ShareRecord {
                party_id: format!("party-{}", i + 1),
                key_type: key.key_type,
                share_id: x,
                secret_share: SecretScalar::from_biguint(&y)?,
                chain_code: key.chain_code,
                declared_public_key: declared_public_key.clone(),
            })
        })
        .collect()
}
