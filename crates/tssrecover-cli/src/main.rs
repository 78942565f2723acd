//! tssrecover: rebuild a single-signer private key from threshold vault shares
//!
//! Reads one share per vault file, interpolates the root key per key type,
//! derives every supported chain's address and key, then re-derives each
//! address from the vaults' public keys and reports any mismatch.
//!
//! # Usage
//!
//! ```bash
//! tssrecover recover --vault a.bak --vault b.bak --threshold 2
//! tssrecover recover --vault a.bak b.bak --chains Bitcoin,Solana --output json
//! tssrecover chains --key-type eddsa
//! tssrecover derive --public-key 02... --chain-code 00...
//! ```

mod config;
mod output;
mod password;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tssrecover_core::{read_shares, ChainCode, DeclaredKey, KeyType, PasswordSource};
use tssrecover_recovery::{derive_addresses, enforce, recover_with, validate, RecoveryError, ValidationPolicy};

use crate::config::Config;
use crate::output::{ChainRow, OutputFormat, RecoveryReport};
use crate::password::{EnvPassword, PromptPassword};

#[derive(Parser)]
#[command(name = "tssrecover")]
#[command(about = "Recover a private key from threshold vault shares", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// TOML config file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log filter (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct keys from vault files and validate every chain address
    Recover(RecoverArgs),

    /// List supported chains
    Chains {
        /// Only chains using this key type (ecdsa, eddsa)
        #[arg(long)]
        key_type: Option<KeyType>,

        #[arg(long, short = 'o', value_enum)]
        output: Option<OutputFormat>,
    },

    /// List addresses from a vault public key and chain code, without any shares
    Derive {
        /// Committee public key (33-byte secp256k1 or 32-byte Ed25519, hex)
        #[arg(long)]
        public_key: String,

        /// Vault chain code (32 bytes, hex)
        #[arg(long)]
        chain_code: String,

        /// Key type; inferred from the public key length when omitted
        #[arg(long)]
        key_type: Option<KeyType>,

        /// Chain names or unique tickers, comma separated
        #[arg(long, value_delimiter = ',')]
        chains: Vec<String>,

        #[arg(long, short = 'o', value_enum)]
        output: Option<OutputFormat>,
    },
}

#[derive(Args)]
struct RecoverArgs {
    /// Vault backup files, one per party
    #[arg(long, short = 'v', required = true, num_args = 1..)]
    vault: Vec<PathBuf>,

    /// Shares required per key type (default: number of vault files)
    #[arg(long, short = 't')]
    threshold: Option<usize>,

    /// Chain names or unique tickers, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    chains: Vec<String>,

    #[arg(long, short = 'o', value_enum)]
    output: Option<OutputFormat>,

    /// Read the vault password from this environment variable instead of prompting
    #[arg(long)]
    password_env: Option<String>,

    /// Print keys even when validation fails (marks failing chains MISMATCH)
    #[arg(long)]
    allow_mismatch: bool,

    /// Print addresses only
    #[arg(long)]
    hide_private_keys: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Keep reconstructed keys out of core files
    tssrecover_core::memory::disable_core_dumps();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_overrides()?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_logging(&config.logging.level);

    match cli.command {
        Commands::Recover(args) => {
            apply_recover_flags(&mut config, &args);
            config.validate().context("Configuration validation failed")?;
            run_recover(&config, &args)
        }
        Commands::Chains { key_type, output } => {
            let rows: Vec<ChainRow> = tssrecover_chains::registry::all()
                .iter()
                .filter(|spec| key_type.map_or(true, |k| spec.key_type == k))
                .map(ChainRow::from)
                .collect();
            let format = output.unwrap_or(config.output.format);
            output::render_chains(&rows, format, &mut std::io::stdout().lock())
        }
        Commands::Derive {
            public_key,
            chain_code,
            key_type,
            chains,
            output,
        } => {
            let public_key = hex::decode(public_key.trim()).context("--public-key is not hex")?;
            let chain_code: ChainCode = chain_code.parse().context("--chain-code")?;
            let key_type = match key_type {
                Some(k) => k,
                None => infer_key_type(&public_key)?,
            };
            let declared = DeclaredKey {
                key_type,
                public_key,
                chain_code,
            };
            let selected = if chains.is_empty() {
                Vec::new()
            } else {
                tssrecover_chains::select(&chains[..])?
            };
            let addresses = derive_addresses(&declared, &selected)?;
            let format = output.unwrap_or(config.output.format);
            output::render_addresses(&addresses, format, &mut std::io::stdout().lock())
        }
    }
}

/// `RUST_LOG`, when set, wins over the configured level.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn apply_recover_flags(config: &mut Config, args: &RecoverArgs) {
    if let Some(threshold) = args.threshold {
        config.recovery.threshold = Some(threshold);
    }
    if !args.chains.is_empty() {
        config.recovery.chains = args.chains.clone();
    }
    if let Some(format) = args.output {
        config.output.format = format;
    }
    if args.allow_mismatch {
        config.recovery.validation_policy = ValidationPolicy::Warn;
    }
    if args.hide_private_keys {
        config.output.show_private_keys = false;
    }
}

fn run_recover(config: &Config, args: &RecoverArgs) -> Result<()> {
    let passwords: Box<dyn PasswordSource> = match &args.password_env {
        Some(var) => Box::new(EnvPassword::new(var.clone())),
        None => Box::new(PromptPassword),
    };

    let mut shares = Vec::new();
    for path in &args.vault {
        let records = read_shares(path, passwords.as_ref())
            .with_context(|| format!("Failed to read vault {}", path.display()))?;
        log::info!("{}: {} share(s)", path.display(), records.len());
        shares.extend(records);
    }

    let threshold = config.recovery.threshold.unwrap_or(args.vault.len());
    let chains = tssrecover_chains::select(&config.recovery.chains[..])?;
    log::info!(
        "Recovering {} chain(s) from {} share(s), threshold {}",
        chains.len(),
        shares.len(),
        threshold
    );

    let set = recover_with(&shares, threshold, &chains).context("Reconstruction failed")?;
    let results = validate(&set.addresses(), &set.declared);

    let policy = config.recovery.validation_policy;
    match enforce(&results, policy) {
        Ok(()) => {}
        Err(RecoveryError::ValidationFailed { chains }) => {
            log::error!(
                "Validation failed for {}; private keys withheld",
                chains.join(", ")
            );
        }
        Err(e) => return Err(e.into()),
    }

    let report = RecoveryReport::new(
        &set,
        &results,
        shares.len(),
        threshold,
        policy,
        config.output.show_private_keys,
    );
    output::render_report(&report, config.output.format, &mut std::io::stdout().lock())
}

fn infer_key_type(public_key: &[u8]) -> Result<KeyType> {
    match public_key.len() {
        33 | 65 => Ok(KeyType::Ecdsa),
        32 => Ok(KeyType::Eddsa),
        n => anyhow::bail!(
            "cannot infer key type from a {}-byte public key; pass --key-type",
            n
        ),
    }
}
