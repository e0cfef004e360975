//! Credential and API key resolution.
//!
//! Each secret in the config can be given three ways, checked in order:
//!
//! 1. **Inline value** - handy for a quick local run (`"password": "..."`)
//! 2. **File** - Docker-secrets style (`"password_file": "/run/secrets/portal"`)
//! 3. **Environment variable** - the default for unattended runs
//!    (`"password_env_var": "PORTAL_PASSWORD"`, also picked up from `.env`)

use secrecy::SecretString;
use std::fs;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: inline value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// The three places one secret may come from. Empty strings count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSource<'a> {
    pub value: Option<&'a str>,
    pub file: Option<&'a str>,
    pub env_var: Option<&'a str>,
}

impl<'a> SecretSource<'a> {
    pub fn new(value: Option<&'a str>, file: Option<&'a str>, env_var: Option<&'a str>) -> Self {
        Self {
            value: non_empty(value),
            file: non_empty(file),
            env_var: non_empty(env_var),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.value.is_some() || self.file.is_some() || self.env_var.is_some()
    }

    /// Resolves the secret, trimming surrounding whitespace.
    ///
    /// The first configured source decides the outcome: a missing file or
    /// unset variable is an error even if a later source would succeed.
    pub fn resolve(&self) -> Result<SecretString> {
        if let Some(value) = self.value {
            return Ok(SecretString::from(value.to_string()));
        }

        if let Some(path) = self.file {
            let expanded = expand_home(path);
            return fs::read_to_string(&expanded)
                .map(|content| SecretString::from(content.trim().to_string()))
                .map_err(|source| SecretError::FileReadError {
                    path: expanded,
                    source,
                });
        }

        if let Some(name) = self.env_var {
            return match std::env::var(name) {
                Ok(value) => Ok(SecretString::from(value.trim().to_string())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided)
    }

    /// Like [`resolve`](Self::resolve), but `Ok(None)` when nothing is configured.
    pub fn resolve_optional(&self) -> Result<Option<SecretString>> {
        match self.resolve() {
            Ok(secret) => Ok(Some(secret)),
            Err(SecretError::NoSourceProvided) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Expands a leading `~` or `~/` to the home directory.
///
/// `~user/...` is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
