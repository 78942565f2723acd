//! CLI configuration, parsed from an optional TOML file plus environment
//! variable overrides.
//!
//! Priority: command-line flags > environment variables > config file > defaults.
//! Flags are applied by `main` after [`Config::apply_env_overrides`].

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tssrecover_recovery::ValidationPolicy;

use crate::output::OutputFormat;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub recovery: RecoverySection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Reconstruction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoverySection {
    /// Shares required per key type. Defaults to the number of vault files.
    pub threshold: Option<usize>,

    /// Chain names or unique tickers to recover (empty = every chain)
    #[serde(default)]
    pub chains: Vec<String>,

    /// What a failed address validation does: "abort" or "warn"
    #[serde(default)]
    pub validation_policy: ValidationPolicy,
}

/// Output rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// "text", "json" or "yaml"
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_show_private_keys")]
    pub show_private_keys: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            show_private_keys: default_show_private_keys(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log filter (error, warn, info, debug, trace or an env_logger spec)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_show_private_keys() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ============================================================================
// Loading & environment override
// ============================================================================

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Config file when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `TSSRECOVER_THRESHOLD`
    /// - `TSSRECOVER_OUTPUT`
    /// - `TSSRECOVER_LOG_LEVEL`
    /// - `TSSRECOVER_VALIDATION_POLICY`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = var("TSSRECOVER_THRESHOLD") {
            let threshold = v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("TSSRECOVER_THRESHOLD is not a number: {}", v))?;
            self.recovery.threshold = Some(threshold);
        }
        if let Some(v) = var("TSSRECOVER_OUTPUT") {
            self.output.format = OutputFormat::from_str(v.trim(), true)
                .map_err(|e| anyhow::anyhow!("TSSRECOVER_OUTPUT: {}", e))?;
        }
        if let Some(v) = var("TSSRECOVER_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = var("TSSRECOVER_VALIDATION_POLICY") {
            self.recovery.validation_policy = v
                .parse()
                .map_err(|e| anyhow::anyhow!("TSSRECOVER_VALIDATION_POLICY: {}", e))?;
        }
        Ok(())
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.recovery.threshold {
            anyhow::ensure!(threshold > 0, "recovery.threshold must be > 0");
        }

        tssrecover_chains::select(&self.recovery.chains[..]).context("recovery.chains")?;

        anyhow::ensure!(
            !self.logging.level.trim().is_empty(),
            "logging.level must not be empty"
        );

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
