//! Error types for Veil Core.

use thiserror::Error;

/// Malformed event fields, detected before anything is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected a JSON object for the event")]
    NotAnObject,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("created_at must be a non-negative integer")]
    InvalidCreatedAt,

    #[error("kind must be an integer in 0..=4294967295")]
    InvalidKind,

    #[error("tags must be an array of arrays of strings")]
    InvalidTags,

    #[error("content must be a string")]
    InvalidContent,

    #[error("invalid {field}: expected {expected} hex characters")]
    InvalidHex {
        field: &'static str,
        expected: usize,
    },

    #[error("invalid geohash: {0:?}")]
    InvalidGeohash(String),

    #[error("malformed event JSON: {0}")]
    Json(String),
}

/// Event authenticity failures. The event is discarded; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("event id does not match its canonical hash")]
    IdMismatch,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signature verification failed")]
    InvalidSignature,
}

/// Human-readable key text errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("bech32 decoding failed: {0}")]
    Encoding(String),

    #[error("expected prefix '{expected}', got '{got}'")]
    WrongPrefix { expected: &'static str, got: String },

    #[error("unknown key prefix '{0}'")]
    UnknownPrefix(String),

    #[error("key payload must be 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("not a valid secp256k1 key")]
    InvalidKey,
}

/// Umbrella error for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        ValidationError::Json(e.to_string())
    }
}
