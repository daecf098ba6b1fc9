//! Identity tokens for TrustCore.
//!
//! This crate provides the Token Authority: compact ES256-signed bearer tokens
//! binding a user identifier to a single P-256 keypair.
//!
//! A token is `header.payload.signature`, each part base64url without padding.
//! The payload is exactly `{"userID":"<uuid>"}`. Verification trusts only the
//! authority's own key and checks no expiry, issuer or audience.

pub mod authority;
pub mod claims;
pub mod error;
pub mod jws;
pub mod key;

pub use authority::TokenAuthority;
pub use claims::{IdentityClaims, USER_ID_CLAIM};
pub use error::{TokenError, TokenResult};
pub use jws::ALGORITHM;

// Re-export core types for convenience
pub use trustcore_core::ErrorKind;
