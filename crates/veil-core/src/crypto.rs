//! Cryptographic primitives for Veil.
//!
//! Wraps BIP-340 Schnorr over secp256k1 with strong types. Signatures always
//! bind to an [`EventId`], never to a freshly re-derived hash.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use secp256k1::{schnorr, Message, XOnlyPublicKey, SECP256K1};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{FormatError, SignatureError};
use crate::types::EventId;

/// A 32-byte x-only secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes without checking the point.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from raw bytes, rejecting anything that is not on the curve.
    pub fn parse(bytes: [u8; 32]) -> Result<Self, SignatureError> {
        XOnlyPublicKey::from_slice(&bytes).map_err(|_| SignatureError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)?;
        Ok(Self(arr))
    }

    /// The x-only key as understood by libsecp256k1.
    pub fn to_xonly(&self) -> Result<XOnlyPublicKey, SignatureError> {
        XOnlyPublicKey::from_slice(&self.0).map_err(|_| SignatureError::InvalidPublicKey)
    }

    /// Verify a signature over an event id.
    pub fn verify_strict(&self, id: &EventId, signature: &Signature) -> Result<(), SignatureError> {
        let xonly = self.to_xonly()?;
        let sig = schnorr::Signature::from_slice(&signature.0)
            .map_err(|_| SignatureError::InvalidSignature)?;
        let msg = Message::from_digest(id.0);
        SECP256K1
            .verify_schnorr(&sig, &msg, &xonly)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    /// Verify a signature over an event id. Malformed input yields `false`.
    pub fn verify(&self, id: &EventId, signature: &Signature) -> bool {
        self.verify_strict(id, signature).is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 64-byte BIP-340 Schnorr signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string (128 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; 64];
        hex::decode_to_slice(s, &mut arr)?;
        Ok(Self(arr))
    }

    /// The zero signature (invalid, used as placeholder).
    pub const ZERO: Self = Self([0u8; 64]);
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 32-byte secp256k1 secret scalar.
///
/// Zeroized on drop. `Debug` never prints the key material.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Create from raw bytes, rejecting zero and values at or above the curve order.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, FormatError> {
        secp256k1::SecretKey::from_slice(&bytes).map_err(|_| FormatError::InvalidKey)?;
        Ok(Self(bytes))
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, FormatError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { .. } => FormatError::InvalidHex(e.to_string()),
            _ => FormatError::InvalidLength(s.len() / 2),
        })?;
        let key = Self::from_bytes(arr);
        arr.zeroize();
        key
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The scalar as understood by libsecp256k1.
    pub fn to_secp(&self) -> Result<secp256k1::SecretKey, FormatError> {
        secp256k1::SecretKey::from_slice(&self.0).map_err(|_| FormatError::InvalidKey)
    }

    /// Derive the x-only public key.
    pub fn public_key(&self) -> Result<PublicKey, FormatError> {
        Ok(Keypair::from_secret(self)?.public_key())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretKey {}

/// A keypair for signing events.
///
/// This wraps secp256k1's Keypair and caches the x-only public key.
#[derive(Clone)]
pub struct Keypair {
    inner: secp256k1::Keypair,
    public: PublicKey,
}

impl Keypair {
    /// Generate a new random keypair from the OS RNG.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generate a keypair from a caller-supplied cryptographic RNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret = secp256k1::SecretKey::new(rng);
        Self::from_secp(secp256k1::Keypair::from_secret_key(SECP256K1, &secret))
    }

    /// Create from an existing secret key.
    pub fn from_secret(secret: &SecretKey) -> Result<Self, FormatError> {
        let inner = secp256k1::Keypair::from_seckey_slice(SECP256K1, secret.as_bytes())
            .map_err(|_| FormatError::InvalidKey)?;
        Ok(Self::from_secp(inner))
    }

    /// Create from 32 secret bytes.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, FormatError> {
        let inner = secp256k1::Keypair::from_seckey_slice(SECP256K1, bytes)
            .map_err(|_| FormatError::InvalidKey)?;
        Ok(Self::from_secp(inner))
    }

    fn from_secp(inner: secp256k1::Keypair) -> Self {
        let (xonly, _parity) = inner.x_only_public_key();
        Self {
            inner,
            public: PublicKey(xonly.serialize()),
        }
    }

    /// Get the x-only public key.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Get a copy of the secret key.
    pub fn secret_key(&self) -> SecretKey {
        SecretKey(self.inner.secret_bytes())
    }

    /// Sign an event id with 32 bytes of fresh auxiliary randomness.
    pub fn sign(&self, id: &EventId) -> Signature {
        let mut aux = [0u8; 32];
        OsRng.fill_bytes(&mut aux);
        self.sign_with_aux(id, &aux)
    }

    /// Sign an event id with explicit auxiliary randomness.
    ///
    /// Deterministic for a fixed `aux`, which is for test vectors only. Callers
    /// either use [`Keypair::sign`] or pass fresh bytes from a CSPRNG.
    #[doc(hidden)]
    pub fn sign_with_aux(&self, id: &EventId, aux: &[u8; 32]) -> Signature {
        let msg = Message::from_digest(id.0);
        let sig = SECP256K1.sign_schnorr_with_aux_rand(&msg, &self.inner, aux);
        Signature(sig.serialize())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

impl Drop for Keypair {
    fn drop(&mut self) {
        self.inner.non_secure_erase();
    }
}

/// Verify hex-encoded inputs as they arrive off the wire.
///
/// Returns `false` for bad hex, wrong lengths, off-curve keys or bad signatures.
pub fn verify_hex(pubkey_hex: &str, id_hex: &str, sig_hex: &str) -> bool {
    let (Ok(pubkey), Ok(id), Ok(sig)) = (
        PublicKey::from_hex(pubkey_hex),
        EventId::from_hex(id_hex),
        Signature::from_hex(sig_hex),
    ) else {
        return false;
    };
    pubkey.verify(&id, &sig)
}
