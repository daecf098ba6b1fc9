//! Compact JWS encoding for ES256 tokens.
//!
//! Format: `base64url(header).base64url(payload).base64url(r || s)`, all
//! segments unpadded. Only ES256 is accepted; the header cannot select a
//! different algorithm.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use signature::{Signer, Verifier};

use crate::error::{TokenError, TokenResult};

pub const ALGORITHM: &str = "ES256";
pub const TOKEN_TYPE: &str = "JWT";

const SEGMENT_COUNT: usize = 3;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Sign `payload` and return the compact serialization.
pub(crate) fn sign<T: Serialize>(payload: &T, key: &SigningKey) -> TokenResult<String> {
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: Some(TOKEN_TYPE.to_string()),
    };

    let header_json =
        serde_json::to_vec(&header).map_err(|e| TokenError::Signing(e.to_string()))?;
    let payload_json =
        serde_json::to_vec(payload).map_err(|e| TokenError::Signing(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(payload_json)
    );

    let signature: Signature = key
        .try_sign(signing_input.as_bytes())
        .map_err(|e| TokenError::Signing(e.to_string()))?;

    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    ))
}

/// Check structure, header and signature, returning the raw payload bytes.
///
/// The payload is not interpreted here; claim-shape checks belong to the
/// caller and only run on authentic payloads.
pub(crate) fn verify(token: &str, key: &VerifyingKey) -> TokenResult<Vec<u8>> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != SEGMENT_COUNT {
        return Err(TokenError::InvalidToken(format!(
            "expected {} segments, found {}",
            SEGMENT_COUNT,
            parts.len()
        )));
    }

    let header_bytes = decode_segment("header", parts[0])?;
    let payload = decode_segment("payload", parts[1])?;
    let signature_bytes = decode_segment("signature", parts[2])?;

    let header: Header = serde_json::from_slice(&header_bytes)
        .map_err(|e| TokenError::InvalidToken(format!("malformed header: {}", e)))?;
    if header.alg != ALGORITHM {
        return Err(TokenError::InvalidToken(format!(
            "unexpected signing algorithm {}",
            header.alg
        )));
    }

    let signature = Signature::from_slice(&signature_bytes)
        .map_err(|_| TokenError::InvalidToken("malformed signature".to_string()))?;

    let signing_input_len = parts[0].len() + 1 + parts[1].len();
    key.verify(token[..signing_input_len].as_bytes(), &signature)
        .map_err(|_| TokenError::InvalidToken("signature mismatch".to_string()))?;

    Ok(payload)
}

fn decode_segment(name: &str, segment: &str) -> TokenResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::InvalidToken(format!("bad {} encoding: {}", name, e)))
}
