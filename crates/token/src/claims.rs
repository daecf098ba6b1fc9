//! Fixed-schema claim set carried by identity tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TokenError, TokenResult};

/// JSON name of the single identity claim.
pub const USER_ID_CLAIM: &str = "userID";

/// The claim set: exactly one `userID` string. Extra claims are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityClaims {
    #[serde(rename = "userID")]
    pub user_id: String,
}

impl IdentityClaims {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id: user_id.hyphenated().to_string(),
        }
    }

    /// Parse a verified payload. Any shape problem is an invalid-claims error.
    pub fn from_payload(payload: &[u8]) -> TokenResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| TokenError::InvalidClaims(format!("payload is not JSON: {}", e)))?;

        if !value.is_object() {
            return Err(TokenError::InvalidClaims(
                "claim set must be a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| TokenError::InvalidClaims(e.to_string()))
    }

    /// The `userID` claim as a UUID.
    pub fn user_id(&self) -> TokenResult<Uuid> {
        Uuid::parse_str(&self.user_id).map_err(|e| {
            TokenError::InvalidClaims(format!("{} is not a UUID: {}", USER_ID_CLAIM, e))
        })
    }
}
