//! Rendering of recovery results, registry listings and public address listings.
//!
//! Every chain row carries its validation status. When validation failed under
//! the abort policy the report still lists each chain but carries no private
//! key material at all.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tssrecover_chains::{encode_wif, lookup, ChainAddressSpec, DerivedAddress};
use tssrecover_core::KeyType;
use tssrecover_recovery::{failed_chains, RecoveredKeySet, ValidationPolicy, ValidationResult};
use zeroize::Zeroize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainStatus {
    Passed,
    Mismatch,
}

/// Everything `recover` prints. No `Debug`: it can hold private keys.
#[derive(Serialize)]
pub struct RecoveryReport {
    pub share_count: usize,
    pub threshold: usize,
    pub validation_policy: ValidationPolicy,
    pub validation_passed: bool,
    pub private_keys_withheld: bool,
    pub failed_chains: Vec<String>,
    pub keys: Vec<RootKeyReport>,
    pub chains: Vec<ChainReport>,
}

#[derive(Serialize)]
pub struct RootKeyReport {
    pub key_type: KeyType,
    pub public_key: String,
    pub declared_public_key: String,
    pub chain_code: String,
    pub matches_declared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl Drop for RootKeyReport {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

#[derive(Serialize)]
pub struct ChainReport {
    pub chain: String,
    pub ticker: String,
    pub derive_path: String,
    pub address: String,
    pub status: ChainStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wif: Option<String>,
}

impl Drop for ChainReport {
    fn drop(&mut self) {
        self.private_key.zeroize();
        self.wif.zeroize();
    }
}

impl RecoveryReport {
    /// Combine a recovery with its validation report.
    ///
    /// Private keys are included only when `show_private_keys` is set and the
    /// policy did not withhold them.
    pub fn new(
        set: &RecoveredKeySet,
        results: &[ValidationResult],
        share_count: usize,
        threshold: usize,
        policy: ValidationPolicy,
        show_private_keys: bool,
    ) -> Self {
        let failed = failed_chains(results);
        let withheld = policy == ValidationPolicy::Abort && !failed.is_empty();
        let reveal = show_private_keys && !withheld;

        let keys = set
            .keys
            .iter()
            .map(|(&key_type, key)| {
                let declared = set.declared.get(&key_type);
                RootKeyReport {
                    key_type,
                    public_key: key.public_key().map(hex::encode).unwrap_or_default(),
                    declared_public_key: declared
                        .map(|d| hex::encode(&d.public_key))
                        .unwrap_or_default(),
                    chain_code: key.chain_code.to_string(),
                    matches_declared: set.root_matches_declared(key_type),
                    private_key: reveal.then(|| (*key.scalar.to_hex()).clone()),
                }
            })
            .collect();

        let chains = set
            .chains
            .iter()
            .map(|chain| {
                let result = results.iter().find(|r| r.chain == chain.address.chain);
                // A chain the validator never saw has not passed
                let passed = result.map(|r| r.passed).unwrap_or(false);
                let wif_capable = lookup(&chain.address.chain)
                    .map(ChainAddressSpec::wif_capable)
                    .unwrap_or(false);
                ChainReport {
                    chain: chain.address.chain.clone(),
                    ticker: chain.address.ticker.clone(),
                    derive_path: chain.address.derive_path.clone(),
                    address: chain.address.address.clone(),
                    status: if passed {
                        ChainStatus::Passed
                    } else {
                        ChainStatus::Mismatch
                    },
                    expected_address: result
                        .filter(|r| !r.passed && !r.expected_address.is_empty())
                        .map(|r| r.expected_address.clone()),
                    error: match result {
                        Some(r) => r.error.as_ref().map(|e| e.to_string()),
                        None => Some("not validated".to_string()),
                    },
                    private_key: reveal.then(|| (*chain.private_key.to_hex()).clone()),
                    wif: (reveal && wif_capable)
                        .then(|| (*encode_wif(&chain.private_key, true)).clone()),
                }
            })
            .collect();

        Self {
            share_count,
            threshold,
            validation_policy: policy,
            validation_passed: failed.is_empty(),
            private_keys_withheld: withheld,
            failed_chains: failed,
            keys,
            chains,
        }
    }
}

/// One row of the `chains` listing.
#[derive(Debug, Serialize)]
pub struct ChainRow {
    pub name: &'static str,
    pub ticker: &'static str,
    pub coin_type: u32,
    pub default_path: &'static str,
    pub key_type: KeyType,
}

impl From<&ChainAddressSpec> for ChainRow {
    fn from(spec: &ChainAddressSpec) -> Self {
        Self {
            name: spec.name,
            ticker: spec.ticker,
            coin_type: spec.coin_type,
            default_path: spec.default_path,
            key_type: spec.key_type,
        }
    }
}

pub fn render_report(report: &RecoveryReport, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    emit(report, format, out, write_report_text)
}

pub fn render_chains(rows: &[ChainRow], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    emit(&rows, format, out, |rows, out| {
        writeln!(
            out,
            "{:<22} {:<6} {:>5}  {:<20} KEY",
            "CHAIN", "TICKER", "COIN", "PATH"
        )?;
        for row in rows.iter() {
            writeln!(
                out,
                "{:<22} {:<6} {:>5}  {:<20} {}",
                row.name, row.ticker, row.coin_type, row.default_path, row.key_type
            )?;
        }
        Ok(())
    })
}

pub fn render_addresses(
    addresses: &[DerivedAddress],
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    emit(&addresses, format, out, |addresses, out| {
        for a in addresses.iter() {
            writeln!(
                out,
                "{:<22} {:<6} {:<16} {}",
                a.chain, a.ticker, a.derive_path, a.address
            )?;
        }
        Ok(())
    })
}

fn emit<T: Serialize>(
    value: &T,
    format: OutputFormat,
    out: &mut dyn Write,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> Result<()> {
    match format {
        OutputFormat::Text => text(value, out).context("Failed to write output")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, value).context("Failed to write JSON")?;
            writeln!(out).context("Failed to write output")?;
        }
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut *out, value).context("Failed to write YAML")?
        }
    }
    Ok(())
}

fn write_report_text(report: &RecoveryReport, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "Recovered {} key(s) from {} share(s), threshold {}",
        report.keys.len(),
        report.share_count,
        report.threshold
    )?;
    writeln!(out)?;

    for key in &report.keys {
        let status = if key.matches_declared {
            "matches vault"
        } else {
            "DOES NOT MATCH VAULT"
        };
        writeln!(out, "{} root key ({})", key.key_type, status)?;
        writeln!(out, "    public key    {}", key.public_key)?;
        if !key.matches_declared {
            writeln!(out, "    vault key     {}", key.declared_public_key)?;
        }
        writeln!(out, "    chain code    {}", key.chain_code)?;
        if let Some(private_key) = &key.private_key {
            writeln!(out, "    private key   {}", private_key)?;
        }
    }
    writeln!(out)?;

    if !report.validation_passed {
        let rule = "!".repeat(72);
        writeln!(out, "{}", rule)?;
        writeln!(
            out,
            "!! VALIDATION FAILED for: {}",
            report.failed_chains.join(", ")
        )?;
        writeln!(
            out,
            "!! Recovered addresses do not match the vault's public keys."
        )?;
        if report.private_keys_withheld {
            writeln!(
                out,
                "!! Private keys withheld. Re-run with --allow-mismatch to show them."
            )?;
        } else {
            writeln!(
                out,
                "!! Keys on MISMATCH rows must not be trusted or funded."
            )?;
        }
        writeln!(out, "{}", rule)?;
        writeln!(out)?;
    }

    for chain in &report.chains {
        let (tag, mark) = match chain.status {
            ChainStatus::Passed => ("[ OK ]", ""),
            ChainStatus::Mismatch => ("[MISMATCH]", "  MISMATCH"),
        };
        writeln!(
            out,
            "{} {} ({}) {}",
            tag, chain.chain, chain.ticker, chain.derive_path
        )?;
        writeln!(out, "    address       {}{}", chain.address, mark)?;
        if let Some(expected) = &chain.expected_address {
            writeln!(out, "    expected      {}{}", expected, mark)?;
        }
        if let Some(error) = &chain.error {
            writeln!(out, "    error         {}{}", error, mark)?;
        }
        if let Some(private_key) = &chain.private_key {
            writeln!(out, "    private key   {}{}", private_key, mark)?;
        }
        if let Some(wif) = &chain.wif {
            writeln!(out, "    WIF           {}{}", wif, mark)?;
        }
    }

    let passed = report
        .chains
        .iter()
        .filter(|c| c.status == ChainStatus::Passed)
        .count();
    writeln!(out)?;
    writeln!(
        out,
        "Validation: {}/{} chains passed",
        passed,
        report.chains.len()
    )
}
