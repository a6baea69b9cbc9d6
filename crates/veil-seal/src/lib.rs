//! # Veil Seal
//!
//! Private messages that hide who is talking to whom, and when.
//!
//! ## Overview
//!
//! A message is built in three layers. The innermost **rumor** carries the
//! text and the sender's key but no signature. A **seal** encrypts the rumor
//! to the recipient and is signed by the sender. A **gift wrap** encrypts the
//! seal again from a single-use key, so the only public key visible on the
//! wire belongs to no one.
//!
//! ## Encryption Model
//!
//! Each layer is a `v2` ciphertext:
//!
//! 1. **Conversation key**: secp256k1 ECDH x-coordinate, expanded with
//!    HKDF-SHA256 (info `nip44-v2`, empty salt)
//! 2. **Cipher**: XChaCha20-Poly1305 with a random 24-byte nonce
//! 3. **Text**: `"v2:" + base64url(nonce || ciphertext || tag)`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veil_core::Keypair;
//! use veil_seal::{unwrap, wrap};
//!
//! let alice = Keypair::generate();
//! let bob = Keypair::generate();
//!
//! let gift = wrap("hello", &alice, &bob.public_key()).unwrap();
//! let message = unwrap(&gift, &bob).unwrap();
//! assert_eq!(message.sender, alice.public_key());
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod jitter;
pub mod wrap;

pub use crypto::{AeadNonce, ConversationKey, SharedSecret, HKDF_INFO};
pub use envelope::{decrypt, encrypt, encrypt_with_nonce, Ciphertext};
pub use error::{DecryptionError, EncryptionError, InvalidKey, Result, SealError, UnwrapError};
pub use jitter::{jittered_now, jittered_timestamp, MAX_JITTER_SECS};
pub use wrap::{
    create_gift_wrap, create_rumor, create_seal, unwrap, unwrap_with, wrap, wrap_with, GiftWrap,
    RecipientTag, UnwrappedMessage, WrapOptions,
};
