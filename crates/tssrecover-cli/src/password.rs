//! Password sources available from the command line.

use std::io::{BufRead, IsTerminal};

use tssrecover_core::{PasswordSource, VaultError};
use zeroize::Zeroizing;

/// Reads the password from an environment variable. Every vault gets the same one.
#[derive(Debug, Clone)]
pub struct EnvPassword {
    var: String,
}

impl EnvPassword {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl PasswordSource for EnvPassword {
    fn password(&self, vault: &str) -> Result<Option<Zeroizing<String>>, VaultError> {
        match std::env::var(&self.var) {
            Ok(value) => Ok(Some(Zeroizing::new(value))),
            Err(std::env::VarError::NotPresent) => {
                log::warn!("{} is not set; no password for {}", self.var, vault);
                Ok(None)
            }
            Err(e) => Err(VaultError::PasswordSource(format!("{}: {}", self.var, e))),
        }
    }
}

/// Asks once per encrypted vault. On a terminal the password is read without
/// echo; piped stdin supplies one line per vault.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptPassword;

impl PasswordSource for PromptPassword {
    fn password(&self, vault: &str) -> Result<Option<Zeroizing<String>>, VaultError> {
        if !std::io::stdin().is_terminal() {
            return read_password_line(std::io::stdin().lock());
        }
        let line = rpassword::prompt_password(format!("Password for {}: ", vault))
            .map(Zeroizing::new)
            .map_err(|e| VaultError::PasswordSource(e.to_string()))?;
        Ok(non_empty(&line))
    }
}

/// One line from `reader` with the line ending removed. An empty line or EOF
/// means no password.
fn read_password_line<R: BufRead>(mut reader: R) -> Result<Option<Zeroizing<String>>, VaultError> {
    let mut line = Zeroizing::new(String::new());
    reader
        .read_line(&mut line)
        .map_err(|e| VaultError::PasswordSource(e.to_string()))?;
    Ok(non_empty(&line))
}

fn non_empty(line: &str) -> Option<Zeroizing<String>> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return None;
    }
    Some(Zeroizing::new(trimmed.to_string()))
}
