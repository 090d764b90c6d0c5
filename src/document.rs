//! Shape checks for generated documents.
//!
//! A thin layer of structural conformance checks the harness applies to a
//! generator's output: the canonical `@context` leading entry and the
//! string-or-array `type` convention used throughout the data model.

use serde_json::Value;
use thiserror::Error;

/// First `@context` entry every credential and presentation must carry.
pub const CANONICAL_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document has no `@context` array")]
    MissingContext,

    #[error("`@context` first entry is {found}, expected {CANONICAL_CONTEXT}")]
    WrongCanonicalContext { found: String },
}

/// True when the document's `type` (string or array of strings) includes
/// `expected`.
pub fn has_type(doc: &Value, expected: &str) -> bool {
    match doc.get("type") {
        Some(Value::String(t)) => t == expected,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(expected)),
        _ => false,
    }
}

/// Verify `@context` is an array whose first element is the canonical
/// context URI.
pub fn check_context(doc: &Value) -> Result<(), DocumentError> {
    let Some(context) = doc.get("@context").and_then(Value::as_array) else {
        return Err(DocumentError::MissingContext);
    };
    match context.first().and_then(Value::as_str) {
        Some(CANONICAL_CONTEXT) => Ok(()),
        Some(other) => Err(DocumentError::WrongCanonicalContext {
            found: other.to_string(),
        }),
        None => Err(DocumentError::WrongCanonicalContext {
            found: "nothing".to_string(),
        }),
    }
}
