//! Session token claims and payload decoding
//!
//! Tokens are decoded for routing decisions only. The signature is never
//! verified client-side; the server stays the trust boundary.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TokenError;

/// Base64url with optional padding, lenient about trailing bits.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenClaims {
    /// Subject (user ID), numeric subjects are stringified
    pub sub: String,
    /// Expires at, seconds since epoch
    pub exp: Option<i64>,
    /// Every other claim, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Whether the token is past its expiry at `now` (seconds).
    ///
    /// Tokens without `exp` never expire.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp < now)
    }
}

/// Decode the payload segment of a `header.payload.signature` token
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::SegmentCount(segments.len()));
    }

    let bytes = PAYLOAD_ENGINE.decode(segments[1])?;
    let json = String::from_utf8(bytes)?;

    let Value::Object(mut payload) = serde_json::from_str::<Value>(&json)? else {
        return Err(TokenError::NotAnObject);
    };

    let sub = match payload.remove("sub") {
        Some(Value::String(sub)) if !sub.is_empty() => sub,
        Some(Value::Number(sub)) => sub.to_string(),
        _ => return Err(TokenError::MissingSubject),
    };

    let exp = match payload.remove("exp") {
        None | Some(Value::Null) => None,
        // floor() keeps `exp < now` exact for integer `now`
        Some(Value::Number(exp)) => Some(
            exp.as_i64()
                .or_else(|| exp.as_f64().map(|f| f.floor() as i64))
                .ok_or(TokenError::InvalidExpiry)?,
        ),
        Some(_) => return Err(TokenError::InvalidExpiry),
    };

    Ok(TokenClaims {
        sub,
        exp,
        extra: payload,
    })
}
