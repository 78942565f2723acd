//! Password sources for encrypted vault containers.
//!
//! The reader never prompts on its own. Callers inject a [`PasswordSource`]
//! and the reader asks it only when a container is actually encrypted.

use std::collections::HashMap;

use zeroize::Zeroizing;

use crate::vault::VaultError;

/// Supplies the password for a named vault.
///
/// `vault` is the label the reader was given (usually the file path).
/// Returning `Ok(None)` means "no password available", which the reader turns
/// into [`VaultError::PasswordRequired`].
pub trait PasswordSource {
    fn password(&self, vault: &str) -> Result<Option<Zeroizing<String>>, VaultError>;
}

/// Never has a password. Suitable for unencrypted containers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPassword;

impl PasswordSource for NoPassword {
    fn password(&self, _vault: &str) -> Result<Option<Zeroizing<String>>, VaultError> {
        Ok(None)
    }
}

/// The same password for every vault.
pub struct FixedPassword(Zeroizing<String>);

impl FixedPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }
}

impl PasswordSource for FixedPassword {
    fn password(&self, _vault: &str) -> Result<Option<Zeroizing<String>>, VaultError> {
        Ok(Some(self.0.clone()))
    }
}

/// Per-vault passwords keyed by label, with an optional fallback.
#[derive(Default)]
pub struct PasswordMap {
    entries: HashMap<String, Zeroizing<String>>,
    fallback: Option<Zeroizing<String>>,
}

impl PasswordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, vault: impl Into<String>, password: impl Into<String>) {
        self.entries
            .insert(vault.into(), Zeroizing::new(password.into()));
    }

    pub fn with_fallback(mut self, password: impl Into<String>) -> Self {
        self.fallback = Some(Zeroizing::new(password.into()));
        self
    }
}

impl PasswordSource for PasswordMap {
    fn password(&self, vault: &str) -> Result<Option<Zeroizing<String>>, VaultError> {
        Ok(self
            .entries
            .get(vault)
            .or(self.fallback.as_ref())
            .cloned())
    }
}

impl<T: PasswordSource + ?Sized> PasswordSource for &T {
    fn password(&self, vault: &str) -> Result<Option<Zeroizing<String>>, VaultError> {
        (**self).password(vault)
    }
}
