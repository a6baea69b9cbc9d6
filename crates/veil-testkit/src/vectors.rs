//! Golden test vectors for deterministic verification.
//!
//! These vectors ensure that canonical ids and `v2` ciphertexts come out
//! byte-identical across all implementations.

use veil_core::{canonical_json, EventId, EventKind, PublicKey, SecretKey, Tag, UnsignedEvent};
use veil_seal::{encrypt_with_nonce, AeadNonce};

/// A golden event id vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Every byte of the author key. Ids do not require a curve point.
    pub pubkey_byte: u8,
    pub created_at: u64,
    pub kind: u32,
    pub tags: &'static [&'static [&'static str]],
    pub content: &'static str,
    /// Expected event id (hex).
    pub expected_id: &'static str,
}

/// Get all golden id vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "Empty text note",
            pubkey_byte: 0xaa,
            created_at: 1704067200, // 2024-01-01T00:00:00Z
            kind: 1,
            tags: &[],
            content: "",
            expected_id: "b7d1bf6359a9f4f48d6600242d904b54b54c0b97e464ea7df3f53877ff680f1d",
        },
        GoldenVector {
            name: "Direct message rumor",
            pubkey_byte: 0xbb,
            created_at: 1700000000,
            kind: 14,
            tags: &[],
            content: "hello",
            expected_id: "4940d3230220c9391b83ca8cbd391957d607f4b0ff9b6920db776b0d34d5e7b8",
        },
        GoldenVector {
            name: "Gift wrap with p tag",
            pubkey_byte: 0xcc,
            created_at: 1700000001,
            kind: 1059,
            tags: &[&[
                "p",
                "dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd",
            ]],
            content: "",
            expected_id: "31c55996765be6b8450ab1b4f048924b16bb2482672d68bccd4c405ec1e3f339",
        },
        GoldenVector {
            name: "Location message with escapes",
            pubkey_byte: 0xee,
            created_at: 1700000002,
            kind: 20000,
            tags: &[&["g", "u4pruydq"], &["n", "alice"], &["t", "teleport"]],
            content: "line1\nline2 \"quoted\" back\\slash /path é 🎉\t\u{1}",
            expected_id: "6390f219f212dd72fe66b1337288eb4b185323b97cc4464f0723f15257399e9d",
        },
    ]
}

/// Build the unsigned event a vector describes.
pub fn generate_event_from_vector(vector: &GoldenVector) -> UnsignedEvent {
    let tags = vector
        .tags
        .iter()
        .map(|t| Tag::new(t.iter().copied()))
        .collect();
    UnsignedEvent::new(
        PublicKey::from_bytes([vector.pubkey_byte; 32]),
        vector.created_at,
        EventKind::from_u32(vector.kind),
        tags,
        vector.content,
    )
}

/// Verify all golden vectors produce their expected ids.
///
/// Returns `(name, matches, computed_id)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let event = generate_event_from_vector(v);
            let hex = event.id().to_hex();
            (v.name.to_string(), hex == v.expected_id, hex)
        })
        .collect()
}

/// A golden `v2` ciphertext vector.
#[derive(Debug, Clone)]
pub struct CipherVector {
    pub name: &'static str,
    /// Sender secret scalar, as a small integer.
    pub sender_secret: u8,
    /// Recipient secret scalar, as a small integer.
    pub recipient_secret: u8,
    /// Nonce bytes are `0, 1, 2, ..` when set.
    pub counting_nonce: bool,
    pub plaintext: &'static str,
    /// Expected conversation key (hex).
    pub expected_key: &'static str,
    pub expected_text: &'static str,
}

pub fn cipher_vectors() -> Vec<CipherVector> {
    vec![CipherVector {
        name: "hello between scalars 1 and 2",
        sender_secret: 1,
        recipient_secret: 2,
        counting_nonce: true,
        plaintext: "hello",
        expected_key: "cda556ab9fb55170f7cfc01bb3b6055809c99838ffa9ff3dad0de623aa9f8d37",
        expected_text: "v2:AAECAwQFBgcICQoLDA0ODxAREhMUFRYXxxDr_3FHO8H3r1mM7IhgN2lX63x5",
    }]
}

/// A secret key whose scalar is the integer `n`.
pub fn small_secret(n: u8) -> SecretKey {
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    SecretKey::from_bytes(bytes).expect("small nonzero scalar is a valid secret")
}

/// Encrypt a cipher vector's plaintext with its fixed inputs.
pub fn generate_ciphertext_from_vector(vector: &CipherVector) -> String {
    let mut nonce = [0u8; 24];
    if vector.counting_nonce {
        for (i, b) in nonce.iter_mut().enumerate() {
            *b = i as u8;
        }
    }
    let recipient = small_secret(vector.recipient_secret)
        .public_key()
        .expect("small scalar has a public key");
    encrypt_with_nonce(
        vector.plaintext,
        &small_secret(vector.sender_secret),
        &recipient,
        &AeadNonce::from_bytes(nonce),
    )
    .expect("vector inputs are valid keys")
}

/// The canonical preimage text for a vector, for debugging mismatches.
pub fn preimage(vector: &GoldenVector) -> String {
    let event = generate_event_from_vector(vector);
    canonical_json(
        &event.pubkey,
        event.created_at,
        event.kind,
        &event.tags,
        &event.content,
    )
}

/// Id of a vector computed straight from its preimage text.
pub fn preimage_id(vector: &GoldenVector) -> EventId {
    EventId::from_canonical(&preimage(vector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_seal::{decrypt, ConversationKey};

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, hex) in verify_all_vectors() {
            assert!(matches, "vector '{}' produced {}", name, hex);
        }
    }

    #[test]
    fn test_preimage_path_agrees() {
        for vector in all_vectors() {
            assert_eq!(
                preimage_id(&vector),
                generate_event_from_vector(&vector).id(),
                "vector '{}'",
                vector.name
            );
        }
    }

    #[test]
    fn test_cipher_vectors() {
        for vector in cipher_vectors() {
            let recipient_pk = small_secret(vector.recipient_secret).public_key().unwrap();
            let key =
                ConversationKey::derive(&small_secret(vector.sender_secret), &recipient_pk)
                    .unwrap();
            assert_eq!(hex::encode(key.as_bytes()), vector.expected_key);

            let text = generate_ciphertext_from_vector(&vector);
            assert_eq!(text, vector.expected_text, "vector '{}'", vector.name);

            let sender_pk = small_secret(vector.sender_secret).public_key().unwrap();
            let plain =
                decrypt(&text, &small_secret(vector.recipient_secret), &sender_pk).unwrap();
            assert_eq!(plain, vector.plaintext);
        }
    }

    #[test]
    fn test_different_authors_different_ids() {
        let mut v1 = all_vectors()[0].clone();
        let mut v2 = v1.clone();
        v1.pubkey_byte = 0x01;
        v2.pubkey_byte = 0x02;

        assert_ne!(
            generate_event_from_vector(&v1).id(),
            generate_event_from_vector(&v2).id()
        );
    }
}
