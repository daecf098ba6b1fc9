//! Hex-encoded P-256 signing scalars.
//!
//! The hex string is read as a big-endian unsigned integer. That single
//! integer is both the private exponent and the multiplicand for the public
//! point, so short inputs are left-padded and redundant leading zero bytes
//! are dropped before the key is built.

use p256::ecdsa::SigningKey;
use zeroize::Zeroizing;

use crate::error::{TokenError, TokenResult};

/// Byte length of a P-256 scalar.
pub const SCALAR_LEN: usize = 32;

/// Decode `hex_key` into a signing key, enforcing `0 < scalar < n`.
pub fn signing_key_from_hex(hex_key: &str) -> TokenResult<SigningKey> {
    let bytes = Zeroizing::new(hex::decode(hex_key.trim())?);
    signing_key_from_be_bytes(&bytes)
}

/// Build a signing key from a big-endian scalar of any length.
pub fn signing_key_from_be_bytes(bytes: &[u8]) -> TokenResult<SigningKey> {
    let significant = match bytes.iter().position(|b| *b != 0) {
        Some(first) => &bytes[first..],
        None => {
            return Err(TokenError::InvalidPrivateKey(
                "scalar must be non-zero".to_string(),
            ))
        }
    };

    if significant.len() > SCALAR_LEN {
        return Err(TokenError::InvalidPrivateKey(format!(
            "scalar is {} bytes, at most {} allowed",
            significant.len(),
            SCALAR_LEN
        )));
    }

    let mut scalar = Zeroizing::new([0u8; SCALAR_LEN]);
    scalar[SCALAR_LEN - significant.len()..].copy_from_slice(significant);

    SigningKey::from_slice(&scalar[..]).map_err(|_| {
        TokenError::InvalidPrivateKey("scalar must be less than the curve order".to_string())
    })
}

/// Canonical 32-byte hex form of a signing key.
pub fn signing_key_to_hex(key: &SigningKey) -> Zeroizing<String> {
    Zeroizing::new(hex::encode(key.to_bytes()))
}
