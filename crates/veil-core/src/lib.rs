//! # Veil Core
//!
//! Pure primitives for Veil: events, canonical serialization, Schnorr
//! signatures, key text and rollout buckets.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Event`] - A signed, content-addressed event
//! - [`EventId`] - SHA-256 of the canonical preimage
//! - [`EventKind`] - Closed variant over the integer kind
//! - [`Keypair`] - BIP-340 signing key with its x-only public key
//! - [`Rumor`] - An unsigned private message, only sent inside a seal
//!
//! ## Canonicalization
//!
//! Event ids hash a compact JSON array. See [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod event;
pub mod keys;
pub mod rollout;
pub mod types;
pub mod validation;

pub use canonical::{canonical_bytes, canonical_event, canonical_from_value, canonical_json};
pub use crypto::{verify_hex, Keypair, PublicKey, SecretKey, Signature};
pub use error::{CoreError, FormatError, SignatureError, ValidationError};
pub use event::{Event, EventBuilder, EventKind, Rumor, Tag, UnsignedEvent};
pub use keys::DecodedKey;
pub use rollout::RolloutSeed;
pub use types::{unix_now, EventId, Timestamp};
pub use validation::{event_from_value, validate_event};
