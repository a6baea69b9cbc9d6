//! Human-readable key text: bech32 with `npub` / `nsec` prefixes.
//!
//! The payload is always the raw 32 key bytes. Secret key text is sensitive;
//! callers decide where it may be shown.

use bech32::{FromBase32, ToBase32, Variant};
use zeroize::Zeroize;

use crate::crypto::{Keypair, PublicKey, SecretKey};
use crate::error::FormatError;

/// Prefix for public keys.
pub const NPUB_HRP: &str = "npub";

/// Prefix for secret keys.
pub const NSEC_HRP: &str = "nsec";

/// A key decoded from text of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedKey {
    Public(PublicKey),
    Secret(SecretKey),
}

fn encode(hrp: &str, bytes: &[u8; 32]) -> Result<String, FormatError> {
    bech32::encode(hrp, bytes.to_base32(), Variant::Bech32)
        .map_err(|e| FormatError::Encoding(e.to_string()))
}

/// Decode text into its prefix and 32-byte payload.
fn decode_raw(text: &str) -> Result<(String, [u8; 32]), FormatError> {
    let (hrp, data, variant) =
        bech32::decode(text).map_err(|e| FormatError::Encoding(e.to_string()))?;
    if variant != Variant::Bech32 {
        return Err(FormatError::Encoding("bech32m is not accepted for keys".into()));
    }
    let mut bytes = Vec::<u8>::from_base32(&data).map_err(|e| FormatError::Encoding(e.to_string()))?;
    if bytes.len() != 32 {
        let len = bytes.len();
        bytes.zeroize();
        return Err(FormatError::InvalidLength(len));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    bytes.zeroize();
    Ok((hrp, out))
}

fn expect_hrp(got: String, expected: &'static str) -> Result<(), FormatError> {
    if got == expected {
        Ok(())
    } else {
        Err(FormatError::WrongPrefix { expected, got })
    }
}

impl PublicKey {
    /// Encode as `npub1...`.
    pub fn to_bech32(&self) -> Result<String, FormatError> {
        encode(NPUB_HRP, self.as_bytes())
    }

    /// Decode `npub1...` text. The key must be a valid curve point.
    pub fn from_bech32(text: &str) -> Result<Self, FormatError> {
        let (hrp, bytes) = decode_raw(text)?;
        expect_hrp(hrp, NPUB_HRP)?;
        PublicKey::parse(bytes).map_err(|_| FormatError::InvalidKey)
    }
}

impl SecretKey {
    /// Encode as `nsec1...`.
    pub fn to_bech32(&self) -> Result<String, FormatError> {
        encode(NSEC_HRP, self.as_bytes())
    }

    /// Decode `nsec1...` text. The scalar must be in range.
    pub fn from_bech32(text: &str) -> Result<Self, FormatError> {
        let (hrp, mut bytes) = decode_raw(text)?;
        let checked = expect_hrp(hrp, NSEC_HRP).and_then(|()| SecretKey::from_bytes(bytes));
        bytes.zeroize();
        checked
    }
}

impl Keypair {
    /// The public key as `npub1...`.
    pub fn to_npub(&self) -> Result<String, FormatError> {
        self.public_key().to_bech32()
    }

    /// The secret key as `nsec1...`.
    pub fn to_nsec(&self) -> Result<String, FormatError> {
        self.secret_key().to_bech32()
    }
}

/// Decode key text of either kind, dispatching on the prefix.
pub fn decode(text: &str) -> Result<DecodedKey, FormatError> {
    let (hrp, mut bytes) = decode_raw(text)?;
    let decoded = match hrp.as_str() {
        NPUB_HRP => PublicKey::parse(bytes)
            .map(DecodedKey::Public)
            .map_err(|_| FormatError::InvalidKey),
        NSEC_HRP => SecretKey::from_bytes(bytes).map(DecodedKey::Secret),
        _ => Err(FormatError::UnknownPrefix(hrp)),
    };
    bytes.zeroize();
    decoded
}
