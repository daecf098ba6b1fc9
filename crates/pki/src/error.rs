//! Error types for certificate authority operations.

use thiserror::Error;
use trustcore_core::ErrorKind;

/// Errors that can occur while constructing the CA or issuing certificates.
#[derive(Debug, Error)]
pub enum PkiError {
    /// CA private key PEM block missing or malformed
    #[error("Failed to decode CA private key PEM: {0}")]
    KeyDecode(String),

    /// CA private key bytes could not be parsed as an RSA key
    #[error("Failed to parse CA private key: {0}")]
    KeyParse(String),

    /// Fresh CA key generation failed
    #[error("Failed to generate CA key: {0}")]
    KeyGeneration(String),

    /// Subject public key PEM block missing or malformed
    #[error("Failed to decode public key PEM: {0}")]
    PublicKeyDecode(String),

    /// Subject public key bytes are not a valid SubjectPublicKeyInfo
    #[error("Failed to parse public key: {0}")]
    PublicKeyParse(String),

    /// Randomness source failed while drawing a serial number
    #[error("Failed to generate serial number: {0}")]
    SerialGeneration(String),

    /// Requested validity window is empty or unrepresentable
    #[error("Invalid validity period: {0}")]
    InvalidValidityPeriod(String),

    /// Certificate template could not be built or signed
    #[error("Failed to sign certificate: {0}")]
    Signing(String),

    /// Signed certificate could not be encoded
    #[error("Failed to encode certificate: {0}")]
    Encoding(String),

    /// Private key could not be exported
    #[error("Failed to export CA private key: {0}")]
    Export(String),
}

impl PkiError {
    /// Classify this error for callers that branch on failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PkiError::KeyDecode(_)
            | PkiError::PublicKeyDecode(_)
            | PkiError::InvalidValidityPeriod(_) => ErrorKind::InputMalformation,
            PkiError::KeyParse(_)
            | PkiError::PublicKeyParse(_)
            | PkiError::Signing(_)
            | PkiError::Encoding(_)
            | PkiError::Export(_) => ErrorKind::Cryptographic,
            PkiError::KeyGeneration(_) | PkiError::SerialGeneration(_) => {
                ErrorKind::ResourceExhaustion
            }
        }
    }

    /// Whether the caller may retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Result type for PKI operations.
pub type PkiResult<T> = Result<T, PkiError>;
