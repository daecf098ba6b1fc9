//! Core error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for TrustCore
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration is structurally valid but semantically wrong
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Failure classes shared by both authorities.
///
/// Callers branch on the class instead of matching error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad PEM framing, bad hex, bad token structure. Never becomes valid on retry.
    InputMalformation,
    /// Signature mismatch, key mismatch, unparseable key bytes. Hard rejection.
    Cryptographic,
    /// Randomness source failure. The whole call may be retried.
    ResourceExhaustion,
    /// Missing or wrong-typed claims in an otherwise authentic token.
    ClaimShape,
}

impl ErrorKind {
    /// Whether retrying the entire operation can succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::ResourceExhaustion)
    }
}
