//! Compact JWS decoding for token-mode generator output.
//!
//! Token mode hands the caller a raw `header.payload.signature` string; this
//! module splits it and decodes the JSON parts so the JWT tests can inspect
//! the embedded credential or presentation claim. Signature verification is
//! the implementation's own concern and is not performed here.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("token is not a three-part compact JWS")]
    Malformed,

    #[error("token part is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token part is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A decoded (but unverified) compact JWS.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedJwt {
    pub header: Value,
    pub payload: Value,
    /// Raw base64url signature part; may be empty for unsecured tokens.
    pub signature: String,
}

impl DecodedJwt {
    /// The embedded verifiable credential claim, when present.
    pub fn vc_claim(&self) -> Option<&Value> {
        self.payload.get("vc")
    }

    /// The embedded verifiable presentation claim, when present.
    pub fn vp_claim(&self) -> Option<&Value> {
        self.payload.get("vp")
    }
}

/// Split and decode a compact JWS without verifying the signature.
pub fn decode(token: &str) -> Result<DecodedJwt, JwtError> {
    let mut parts = token.trim().split('.');
    let (Some(header), Some(payload), Some(signature)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(JwtError::Malformed);
    };
    if parts.next().is_some() {
        return Err(JwtError::Malformed);
    }

    let header: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header)?)?;
    let payload: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload)?)?;
    Ok(DecodedJwt {
        header,
        payload,
        signature: signature.to_string(),
    })
}
