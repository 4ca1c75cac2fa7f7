//! Credential decoding and validity checks
//!
//! The client never holds the server's signing key, so a credential is only
//! decoded to read its payload. The one question answered here is whether
//! the embedded expiry is still in the future. Every failure answers "no".

use jsonwebtoken::{DecodingKey, Validation, decode as decode_jwt};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::error::CredentialError;

/// Claims read from a credential payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, when the server sets one
    #[serde(default)]
    pub sub: Option<String>,
    /// User ID, when the server embeds it directly
    #[serde(default)]
    pub id: Option<String>,
    /// Issued at time
    #[serde(default)]
    pub iat: Option<u64>,
    /// Expiration time, seconds since epoch
    pub exp: u64,
}

impl Claims {
    /// The user the credential was issued to
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().or(self.id.as_deref())
    }
}

fn payload_only_validation() -> Validation {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    // Expiry is compared by is_valid_at so that exp == now is already expired
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation
}

/// Decode the payload of a credential without verifying its signature
pub fn decode(token: &str) -> Result<Claims, CredentialError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CredentialError::Missing);
    }

    let data = decode_jwt::<Claims>(
        token,
        &DecodingKey::from_secret(&[]),
        &payload_only_validation(),
    )?;
    Ok(data.claims)
}

/// Current time in seconds since epoch
///
/// A clock set before the epoch yields `u64::MAX` so every credential reads
/// as expired.
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(u64::MAX)
}

/// Check a credential against an explicit point in time
pub fn is_valid_at(token: Option<&str>, now: u64) -> bool {
    let Some(token) = token else {
        return false;
    };

    match decode(token) {
        Ok(claims) => claims.exp > now,
        Err(e) => {
            debug!("Credential rejected: {}", e);
            false
        }
    }
}

/// Check whether a credential is present, well formed and not yet expired
pub fn is_valid(token: Option<&str>) -> bool {
    is_valid_at(token, now())
}
