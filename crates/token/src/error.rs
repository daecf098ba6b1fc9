//! Error types for token operations.

use thiserror::Error;
use trustcore_core::ErrorKind;

/// Errors that can occur while constructing the authority, minting or
/// verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing key is not valid hex
    #[error("Failed to decode token signing key: {0}")]
    KeyDecode(#[from] hex::FromHexError),

    /// Signing scalar is zero, too long, or not below the curve order
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signing or encoding a new token failed
    #[error("Failed to sign token: {0}")]
    Signing(String),

    /// Structure, encoding, header or signature check failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Authentic token whose claim set has the wrong shape
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

impl TokenError {
    /// Classify this error for callers that branch on failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::KeyDecode(_) => ErrorKind::InputMalformation,
            TokenError::InvalidPrivateKey(_) | TokenError::InvalidToken(_) => {
                ErrorKind::Cryptographic
            }
            TokenError::Signing(_) => ErrorKind::ResourceExhaustion,
            TokenError::InvalidClaims(_) => ErrorKind::ClaimShape,
        }
    }

    /// Whether the caller may retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
