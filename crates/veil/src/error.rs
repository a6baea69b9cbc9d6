//! Error types for the Messenger.

use thiserror::Error;
use veil_core::{CoreError, FormatError, SignatureError, ValidationError};
use veil_seal::SealError;
use veil_store::StoreError;

use crate::transport::TransportError;

/// Errors that can occur during Messenger operations.
#[derive(Debug, Error)]
pub enum VeilError {
    /// Validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Signature or id error.
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// Key text error.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Wrapping error.
    #[error("seal error: {0}")]
    Seal(#[from] SealError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl From<CoreError> for VeilError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => VeilError::Validation(e),
            CoreError::Signature(e) => VeilError::Signature(e),
            CoreError::Format(e) => VeilError::Format(e),
        }
    }
}

/// Result type for Messenger operations.
pub type Result<T> = std::result::Result<T, VeilError>;
