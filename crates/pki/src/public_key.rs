//! Subject public key checks.
//!
//! Keys of well-known algorithms must decode as valid keys before the CA
//! signs over them. Other algorithms are carried through unchanged.

use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1};
use const_oid::db::rfc8410::ID_ED_25519;
use der::{Decode, Tag, Tagged};
use spki::{DecodePublicKey, SubjectPublicKeyInfoOwned};

use crate::error::{PkiError, PkiResult};

const ED25519_KEY_LEN: usize = 32;

/// Decode a SubjectPublicKeyInfo and validate its key bytes.
pub(crate) fn parse_subject_key(spki_der: &[u8]) -> PkiResult<SubjectPublicKeyInfoOwned> {
    let spki = SubjectPublicKeyInfoOwned::from_der(spki_der).map_err(parse_error)?;
    let algorithm = spki.algorithm.oid;

    if algorithm == RSA_ENCRYPTION {
        rsa::RsaPublicKey::from_public_key_der(spki_der).map_err(parse_error)?;
    } else if algorithm == ID_EC_PUBLIC_KEY && is_p256(&spki) {
        p256::PublicKey::from_public_key_der(spki_der).map_err(parse_error)?;
    } else if algorithm == ID_ED_25519 {
        let key: [u8; ED25519_KEY_LEN] = spki
            .subject_public_key
            .as_bytes()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| {
                PkiError::PublicKeyParse(format!("Ed25519 key must be {} bytes", ED25519_KEY_LEN))
            })?;
        ed25519_dalek::VerifyingKey::from_bytes(&key).map_err(parse_error)?;
    }

    Ok(spki)
}

fn is_p256(spki: &SubjectPublicKeyInfoOwned) -> bool {
    spki.algorithm
        .parameters
        .as_ref()
        .map(|curve| {
            curve.tag() == Tag::ObjectIdentifier && curve.value() == SECP_256_R_1.as_bytes()
        })
        .unwrap_or(false)
}

fn parse_error<E: std::fmt::Display>(e: E) -> PkiError {
    PkiError::PublicKeyParse(e.to_string())
}
