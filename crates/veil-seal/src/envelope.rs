//! The `v2` ciphertext envelope.
//!
//! Text form: `"v2:" + base64url(nonce(24) || ciphertext || mac(16))`, no
//! padding on output. Input is accepted with or without trailing `=`.

use base64::alphabet::URL_SAFE;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use zeroize::Zeroize;

use veil_core::{PublicKey, SecretKey};

use crate::crypto::{AeadNonce, ConversationKey};
use crate::error::{DecryptionError, EncryptionError};

/// Version prefix on every ciphertext.
pub const VERSION_PREFIX: &str = "v2:";

/// Poly1305 tag length.
pub const MAC_LEN: usize = 16;

/// Smallest valid payload: nonce plus tag over an empty plaintext.
pub const MIN_PAYLOAD_LEN: usize = AeadNonce::LEN + MAC_LEN;

const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A parsed `v2` ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    nonce: AeadNonce,
    /// Encrypted bytes with the tag appended.
    sealed: Vec<u8>,
}

impl Ciphertext {
    /// Parse the text form.
    pub fn parse(text: &str) -> Result<Self, DecryptionError> {
        let body = text
            .strip_prefix(VERSION_PREFIX)
            .ok_or(DecryptionError::UnsupportedVersion)?;
        let payload = BASE64URL
            .decode(body)
            .map_err(|_| DecryptionError::Encoding)?;
        if payload.len() < MIN_PAYLOAD_LEN {
            return Err(DecryptionError::Truncated);
        }

        let mut nonce = [0u8; AeadNonce::LEN];
        nonce.copy_from_slice(&payload[..AeadNonce::LEN]);
        Ok(Self {
            nonce: AeadNonce::from_bytes(nonce),
            sealed: payload[AeadNonce::LEN..].to_vec(),
        })
    }

    /// Render the text form.
    pub fn encode(&self) -> String {
        let mut payload = Vec::with_capacity(AeadNonce::LEN + self.sealed.len());
        payload.extend_from_slice(self.nonce.as_bytes());
        payload.extend_from_slice(&self.sealed);
        format!("{VERSION_PREFIX}{}", BASE64URL.encode(payload))
    }

    pub fn nonce(&self) -> &AeadNonce {
        &self.nonce
    }

    /// Ciphertext followed by the 16-byte tag.
    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }

    /// Total decoded length: nonce, ciphertext and tag.
    pub fn payload_len(&self) -> usize {
        AeadNonce::LEN + self.sealed.len()
    }
}

impl ConversationKey {
    /// Encrypt under this key with the given nonce.
    pub fn seal(&self, plaintext: &str, nonce: &AeadNonce) -> Result<Ciphertext, EncryptionError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.as_bytes()));
        let sealed = cipher
            .encrypt(XNonce::from_slice(nonce.as_bytes()), plaintext.as_bytes())
            .map_err(|_| EncryptionError::Cipher)?;
        Ok(Ciphertext {
            nonce: *nonce,
            sealed,
        })
    }

    /// Verify the tag, then decrypt. No plaintext is released on failure.
    pub fn open(&self, ciphertext: &Ciphertext) -> Result<String, DecryptionError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.as_bytes()));
        let plain = cipher
            .decrypt(
                XNonce::from_slice(ciphertext.nonce.as_bytes()),
                ciphertext.sealed.as_slice(),
            )
            .map_err(|_| DecryptionError::Authentication)?;
        String::from_utf8(plain).map_err(|e| {
            e.into_bytes().zeroize();
            DecryptionError::Utf8
        })
    }
}

/// Encrypt for `remote` with a fresh random nonce.
pub fn encrypt(
    plaintext: &str,
    local: &SecretKey,
    remote: &PublicKey,
) -> Result<String, EncryptionError> {
    encrypt_with_nonce(plaintext, local, remote, &AeadNonce::generate())
}

/// Encrypt with an explicit nonce. Test vectors only.
///
/// A nonce must never be reused under one key; real senders call [`encrypt`].
#[doc(hidden)]
pub fn encrypt_with_nonce(
    plaintext: &str,
    local: &SecretKey,
    remote: &PublicKey,
    nonce: &AeadNonce,
) -> Result<String, EncryptionError> {
    let key = ConversationKey::derive(local, remote)?;
    Ok(key.seal(plaintext, nonce)?.encode())
}

/// Decrypt text produced by `remote` for us.
pub fn decrypt(
    text: &str,
    local: &SecretKey,
    remote: &PublicKey,
) -> Result<String, DecryptionError> {
    let ciphertext = Ciphertext::parse(text)?;
    let key = ConversationKey::derive(local, remote)?;
    key.open(&ciphertext)
}
