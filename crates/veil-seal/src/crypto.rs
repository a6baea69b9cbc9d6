//! Key agreement for sealed messages.
//!
//! Provides secp256k1 ECDH over x-only keys and HKDF-SHA256 derivation of the
//! per-pair conversation key.

use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{ecdh, Parity, XOnlyPublicKey};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use veil_core::{PublicKey, SecretKey};

use crate::error::InvalidKey;

/// HKDF info string. Every peer on the network uses exactly this value.
pub const HKDF_INFO: &[u8] = b"nip44-v2";

/// HKDF salt. Empty, which HKDF treats as a zero-filled block.
pub const HKDF_SALT: &[u8] = &[];

/// The x-coordinate of the ECDH point.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// `local_secret · lift_x(remote)`, where the x-only key is lifted with even Y.
    ///
    /// The x-coordinate does not depend on the parity chosen for the lift, so
    /// both sides agree without exchanging it.
    pub fn compute(local: &SecretKey, remote: &PublicKey) -> Result<Self, InvalidKey> {
        let xonly = XOnlyPublicKey::from_slice(remote.as_bytes()).map_err(|_| InvalidKey)?;
        let point = xonly.public_key(Parity::Even);
        let scalar = local.to_secp().map_err(|_| InvalidKey)?;

        let mut xy = ecdh::shared_secret_point(&point, &scalar);
        let mut x = [0u8; 32];
        x.copy_from_slice(&xy[..32]);
        xy.zeroize();
        Ok(Self(x))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// The symmetric key shared by one pair of identities.
///
/// Symmetric: `derive(a, B) == derive(b, A)`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ConversationKey([u8; 32]);

impl ConversationKey {
    /// ECDH followed by HKDF-SHA256 expansion to 32 bytes.
    pub fn derive(local: &SecretKey, remote: &PublicKey) -> Result<Self, InvalidKey> {
        let shared = SharedSecret::compute(local, remote)?;
        let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), shared.as_bytes());
        let mut okm = [0u8; 32];
        hk.expand(HKDF_INFO, &mut okm).map_err(|_| InvalidKey)?;
        Ok(Self(okm))
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// 192-bit nonce for XChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeadNonce([u8; 24]);

impl AeadNonce {
    pub const LEN: usize = 24;

    /// A fresh nonce from OS entropy.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    pub fn generate_with_rng<R: RngCore>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 24];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 24]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 24] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::Keypair;

    fn secret(n: u8) -> SecretKey {
        let mut b = [0u8; 32];
        b[31] = n;
        SecretKey::from_bytes(b).unwrap()
    }

    #[test]
    fn test_shared_secret_vector() {
        let pk2 = secret(2).public_key().unwrap();
        let shared = SharedSecret::compute(&secret(1), &pk2).unwrap();
        // 1 · G2 is G2 itself
        assert_eq!(shared.as_bytes(), pk2.as_bytes());
    }

    #[test]
    fn test_conversation_key_vector() {
        let pk2 = secret(2).public_key().unwrap();
        let key = ConversationKey::derive(&secret(1), &pk2).unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "cda556ab9fb55170f7cfc01bb3b6055809c99838ffa9ff3dad0de623aa9f8d37"
        );
    }

    #[test]
    fn test_conversation_key_symmetric() {
        let alice = Keypair::generate();
        let bob = Keypair::generate();

        let ab = ConversationKey::derive(&alice.secret_key(), &bob.public_key()).unwrap();
        let ba = ConversationKey::derive(&bob.secret_key(), &alice.public_key()).unwrap();
        assert_eq!(ab.as_bytes(), ba.as_bytes());

        let carol = Keypair::generate();
        let ac = ConversationKey::derive(&alice.secret_key(), &carol.public_key()).unwrap();
        assert_ne!(ab.as_bytes(), ac.as_bytes());
    }

    #[test]
    fn test_off_curve_peer_rejected() {
        let bad = PublicKey::from_bytes([0xff; 32]);
        assert!(ConversationKey::derive(&secret(1), &bad).is_err());
    }

    #[test]
    fn test_nonces_are_fresh() {
        assert_ne!(AeadNonce::generate(), AeadNonce::generate());
    }
}
