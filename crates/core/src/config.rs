//! Configuration management for TrustCore.
//!
//! Key material reaches the authorities only through this configuration; the
//! authorities never read the environment or the filesystem themselves.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Environment variable holding an inline CA private key PEM.
pub const ENV_CA_PRIVATE_KEY: &str = "CA_PRIVATE_KEY";
/// Environment variable holding the hex-encoded token signing scalar.
pub const ENV_TOKEN_PRIVATE_KEY_HEX: &str = "TOKEN_PRIVATE_KEY_HEX";
/// Environment variable overriding the configured log level.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub certificate_authority: CertificateAuthorityConfig,
    pub token_authority: TokenAuthorityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateAuthorityConfig {
    /// Inline PEM private key. Empty means a fresh CA is generated.
    pub private_key_pem: String,
    /// Path to a PEM private key, alternative to `private_key_pem`.
    pub private_key_path: Option<PathBuf>,
    pub organization: String,
    pub country: String,
    pub common_name: String,
    /// Default validity for issued leaf certificates.
    pub leaf_validity_days: u64,
}

impl Default for CertificateAuthorityConfig {
    fn default() -> Self {
        Self {
            private_key_pem: String::new(),
            private_key_path: None,
            organization: "Verifiable SN".to_string(),
            country: "US".to_string(),
            common_name: "Verifiable SN CA".to_string(),
            leaf_validity_days: 365,
        }
    }
}

impl std::fmt::Debug for CertificateAuthorityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateAuthorityConfig")
            .field("private_key_pem", &redacted(&self.private_key_pem))
            .field("private_key_path", &self.private_key_path)
            .field("organization", &self.organization)
            .field("country", &self.country)
            .field("common_name", &self.common_name)
            .field("leaf_validity_days", &self.leaf_validity_days)
            .finish()
    }
}

impl CertificateAuthorityConfig {
    /// Resolve the configured CA key, reading `private_key_path` if needed.
    ///
    /// Returns `None` when no key is configured, which selects fresh mode.
    pub fn resolve_private_key_pem(&self) -> Result<Option<String>> {
        if !self.private_key_pem.trim().is_empty() {
            return Ok(Some(self.private_key_pem.clone()));
        }

        match self.key_path() {
            Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
            None => Ok(None),
        }
    }

    /// Configured key path; an empty path counts as unset.
    fn key_path(&self) -> Option<&Path> {
        self.private_key_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Default leaf validity as a duration.
    pub fn leaf_validity(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.leaf_validity_days.saturating_mul(24 * 60 * 60))
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenAuthorityConfig {
    /// Hex-encoded P-256 scalar. Empty means an ephemeral key is generated.
    pub private_key_hex: String,
}

impl std::fmt::Debug for TokenAuthorityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthorityConfig")
            .field("private_key_hex", &redacted(&self.private_key_hex))
            .finish()
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(pem) = lookup(ENV_CA_PRIVATE_KEY) {
            self.certificate_authority.private_key_pem = pem;
            self.certificate_authority.private_key_path = None;
        }
        if let Some(hex) = lookup(ENV_TOKEN_PRIVATE_KEY_HEX) {
            self.token_authority.private_key_hex = hex;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ca = &self.certificate_authority;

        if ca.leaf_validity_days == 0 {
            return Err(CoreError::Config(
                "certificate_authority.leaf_validity_days must be positive".to_string(),
            ));
        }

        for (field, value) in [
            ("organization", &ca.organization),
            ("country", &ca.country),
            ("common_name", &ca.common_name),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!(
                    "certificate_authority.{} must not be empty",
                    field
                )));
            }
        }

        if !ca.private_key_pem.trim().is_empty() && ca.key_path().is_some() {
            return Err(CoreError::Config(
                "certificate_authority: set private_key_pem or private_key_path, not both"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
