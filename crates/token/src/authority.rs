//! Token Authority minting and verifying identity tokens.
//!
//! # Security Model
//!
//! - One P-256 key per authority, fixed at construction
//! - Only tokens signed by this authority's own key are trusted
//! - Tokens carry exactly one claim (`userID`) and no expiry; lifetime
//!   policy belongs to the caller
//! - The private scalar is never logged and is zeroized after decoding

use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::{EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use trustcore_core::TokenAuthorityConfig;

use crate::claims::IdentityClaims;
use crate::error::{TokenError, TokenResult};
use crate::jws;
use crate::key;

/// Mints and verifies compact ES256 identity tokens.
pub struct TokenAuthority {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    key_id: String,
}

impl TokenAuthority {
    /// Construct from a hex-encoded private scalar.
    pub fn from_hex(hex_private_key: &str) -> TokenResult<Self> {
        let signing_key = key::signing_key_from_hex(hex_private_key)?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Construct with a freshly generated key.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Construct from configuration. An empty key yields an ephemeral
    /// authority whose tokens do not survive a restart.
    pub fn from_config(config: &TokenAuthorityConfig) -> TokenResult<Self> {
        if config.private_key_hex.trim().is_empty() {
            warn!("no token signing key configured, generating an ephemeral key");
            return Ok(Self::generate());
        }
        Self::from_hex(&config.private_key_hex)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = *signing_key.verifying_key();
        let key_id = generate_key_id(&verifying_key);

        info!(key_id = %key_id, "token authority initialized");

        Self {
            signing_key,
            verifying_key,
            key_id,
        }
    }

    /// Mint a token carrying `user_id` as its only claim.
    pub fn mint(&self, user_id: Uuid) -> TokenResult<String> {
        let token = jws::sign(&IdentityClaims::new(user_id), &self.signing_key)?;
        debug!(user_id = %user_id, key_id = %self.key_id, "minted identity token");
        Ok(token)
    }

    /// Verify a token signed by this authority and return its user id.
    pub fn verify(&self, token: &str) -> TokenResult<Uuid> {
        let result = jws::verify(token, &self.verifying_key)
            .and_then(|payload| IdentityClaims::from_payload(&payload))
            .and_then(|claims| claims.user_id());

        if let Err(e) = &result {
            debug!(error = %e, "rejected identity token");
        }

        result
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Stable identifier of the public key: hex of the first 16 bytes of
    /// SHA-256 over the compressed SEC1 point.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Public key as a SubjectPublicKeyInfo PEM block.
    pub fn public_key_pem(&self) -> TokenResult<String> {
        self.verifying_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Canonical 32-byte hex form of the private scalar, accepted by
    /// [`Self::from_hex`].
    pub fn export_private_key_hex(&self) -> Zeroizing<String> {
        key::signing_key_to_hex(&self.signing_key)
    }
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

fn generate_key_id(verifying_key: &VerifyingKey) -> String {
    let point = verifying_key.to_encoded_point(true);
    let hash = Sha256::digest(point.as_bytes());
    hex::encode(&hash[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY_HEX: &str = "c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721";

    #[test]
    fn test_mint_and_verify() {
        let authority = TokenAuthority::from_hex(TEST_KEY_HEX).unwrap();
        let user = Uuid::new_v4();

        let token = authority.mint(user).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(authority.verify(&token).unwrap(), user);
    }

    #[test]
    fn test_export_round_trip() {
        let authority = TokenAuthority::generate();
        let restored = TokenAuthority::from_hex(&authority.export_private_key_hex()).unwrap();

        assert_eq!(authority.verifying_key(), restored.verifying_key());
        assert_eq!(authority.key_id(), restored.key_id());

        let token = authority.mint(Uuid::new_v4()).unwrap();
        assert!(restored.verify(&token).is_ok());
    }

    #[test]
    fn test_key_id_is_stable() {
        let a = TokenAuthority::from_hex(TEST_KEY_HEX).unwrap();
        let b = TokenAuthority::from_hex(TEST_KEY_HEX).unwrap();
        assert_eq!(a.key_id(), b.key_id());
        assert_eq!(a.key_id().len(), 32);
    }

    #[test]
    fn test_from_config() {
        let mut config = TokenAuthorityConfig::default();
        let ephemeral = TokenAuthority::from_config(&config).unwrap();

        config.private_key_hex = TEST_KEY_HEX.to_string();
        let configured = TokenAuthority::from_config(&config).unwrap();

        assert_ne!(ephemeral.verifying_key(), configured.verifying_key());
        assert_eq!(
            configured.export_private_key_hex().as_str(),
            TEST_KEY_HEX
        );
    }

    #[test]
    fn test_public_key_pem() {
        let authority = TokenAuthority::from_hex(TEST_KEY_HEX).unwrap();
        let pem = authority.public_key_pem().unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let authority = TokenAuthority::from_hex(TEST_KEY_HEX).unwrap();
        let rendered = format!("{:?}", authority);
        assert!(!rendered.contains(TEST_KEY_HEX));
        assert!(rendered.contains("key_id"));
    }
}
