//! Secret values and where they come from.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

pub const OPENAI_API_KEY: &str = "PARLEY_OPENAI_API_KEY";
pub const TAVILY_API_KEY: &str = "PARLEY_TAVILY_API_KEY";

/// An API key. Formatting never shows the value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("secret backend failed for {key}: {reason}")]
pub struct VaultError {
    pub key: String,
    pub reason: String,
}

pub type SecretFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<Secret>, VaultError>> + Send + 'a>>;

/// Looks up a secret by name. `Ok(None)` means the secret is simply not configured.
pub trait VaultProvider: Send + Sync {
    fn get_secret(&self, key: &str) -> SecretFuture<'_>;
}

/// Reads secrets from the process environment. Blank values count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVaultProvider;

impl VaultProvider for EnvVaultProvider {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let value = match std::env::var(key) {
            Ok(v) if v.trim().is_empty() => Ok(None),
            Ok(v) => Ok(Some(Secret::new(v.trim()))),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e @ std::env::VarError::NotUnicode(_)) => Err(VaultError {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        };
        Box::pin(async move { value })
    }
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct MapVault(std::collections::HashMap<&'static str, &'static str>);

#[cfg(test)]
impl MapVault {
    pub(crate) fn with(mut self, key: &'static str, value: &'static str) -> Self {
        self.0.insert(key, value);
        self
    }
}

#[cfg(test)]
impl VaultProvider for MapVault {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let found = self.0.get(key).map(|v| Secret::new(*v));
        Box::pin(async move { Ok(found) })
    }
}
