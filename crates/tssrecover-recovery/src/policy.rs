//! What a failed validation does to the recovery as a whole.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationResult;
use crate::RecoveryError;

/// `Abort` (the default) refuses to hand out keys when any chain failed;
/// `Warn` reports failures and carries on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    #[default]
    Abort,
    Warn,
}

impl fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationPolicy::Abort => write!(f, "abort"),
            ValidationPolicy::Warn => write!(f, "warn"),
        }
    }
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(ValidationPolicy::Abort),
            "warn" => Ok(ValidationPolicy::Warn),
            other => Err(format!(
                "unknown validation policy '{}' (expected abort or warn)",
                other
            )),
        }
    }
}

/// Names of the chains that failed.
pub fn failed_chains(results: &[ValidationResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| r.chain.clone())
        .collect()
}

/// Apply `policy` to a validation report.
pub fn enforce(results: &[ValidationResult], policy: ValidationPolicy) -> Result<(), RecoveryError> {
    let failed = failed_chains(results);
    if failed.is_empty() {
        return Ok(());
    }
    match policy {
        ValidationPolicy::Abort => Err(RecoveryError::ValidationFailed { chains: failed }),
        ValidationPolicy::Warn => {
            for result in results.iter().filter(|r| !r.passed) {
                match &result.error {
                    Some(error) => log::warn!("{}: {}", result.chain, error),
                    None => log::warn!("{}: validation failed", result.chain),
                }
            }
            Ok(())
        }
    }
}
