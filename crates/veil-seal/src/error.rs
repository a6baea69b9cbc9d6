//! Error types for sealing and unsealing.

use thiserror::Error;
use veil_core::CoreError;

/// A key that cannot take part in ECDH: off-curve point or out-of-range scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid key for key agreement")]
pub struct InvalidKey;

/// Errors producing a `v2` ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncryptionError {
    #[error("invalid key")]
    InvalidKey,

    #[error("cipher failure")]
    Cipher,
}

/// Errors opening a `v2` ciphertext. Nothing partial is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptionError {
    #[error("unsupported ciphertext version")]
    UnsupportedVersion,

    #[error("ciphertext is not valid base64url")]
    Encoding,

    #[error("ciphertext payload too short")]
    Truncated,

    #[error("authentication failed")]
    Authentication,

    #[error("invalid key")]
    InvalidKey,

    #[error("plaintext is not valid UTF-8")]
    Utf8,
}

/// An inbound gift wrap could not be opened.
///
/// Deliberately carries no cause: every failure looks the same to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("unable to unwrap message")]
pub struct UnwrapError;

/// Errors on the outbound wrap path.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("encryption failed: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("expected kind {expected}, got kind {got}")]
    WrongKind { expected: u32, got: u32 },

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl From<InvalidKey> for EncryptionError {
    fn from(_: InvalidKey) -> Self {
        EncryptionError::InvalidKey
    }
}

impl From<InvalidKey> for DecryptionError {
    fn from(_: InvalidKey) -> Self {
        DecryptionError::InvalidKey
    }
}

/// Result type for wrap operations.
pub type Result<T> = std::result::Result<T, SealError>;
