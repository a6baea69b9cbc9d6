//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use veil::transport::memory::{MemoryNetwork, MemoryTransport};
use veil::{Messenger, MessengerConfig};
use veil_core::{unix_now, Event, EventBuilder, Keypair, PublicKey};
use veil_seal::{wrap, GiftWrap};
use veil_store::MemoryStore;

/// A test fixture with a keypair.
pub struct TestFixture {
    pub keypair: Keypair,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from a secret.
    ///
    /// Panics if `secret` is zero or not below the curve order.
    pub fn with_secret(secret: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_secret_bytes(&secret).expect("valid fixture secret"),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Create a signed text note.
    pub fn make_text_note(&self, content: &str) -> Event {
        EventBuilder::text_note(content)
            .created_at(unix_now())
            .sign(&self.keypair)
    }

    /// Create a signed location message.
    pub fn make_location(&self, content: &str, geohash: &str) -> Event {
        EventBuilder::location_message(content, geohash, "fixture", false)
            .expect("valid fixture geohash")
            .created_at(unix_now())
            .sign(&self.keypair)
    }

    /// Wrap a private message to `recipient`.
    pub fn make_gift_wrap(&self, recipient: &PublicKey, content: &str) -> GiftWrap {
        wrap(content, &self.keypair, recipient).expect("valid fixture keys")
    }

    /// A messenger for this identity on `network`, backed by a memory store.
    pub async fn messenger(
        &self,
        network: &Arc<MemoryNetwork>,
    ) -> Messenger<MemoryStore, MemoryTransport> {
        let transport = network.create_transport(self.public_key()).await;
        Messenger::new(
            self.keypair.clone(),
            MemoryStore::new(),
            transport,
            MessengerConfig::default(),
        )
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut secret = [0u8; 32];
            secret[0] = 1;
            secret[24..].copy_from_slice(&(i as u64).to_be_bytes());
            TestFixture::with_secret(secret)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::{validate_event, EventKind};
    use veil_seal::unwrap;

    #[test]
    fn test_fixture_events() {
        let fixture = TestFixture::new();

        let note = fixture.make_text_note("hello");
        assert_eq!(note.kind, EventKind::TextNote);
        assert!(validate_event(&note).is_ok());

        let location = fixture.make_location("hi", "9q8yy");
        assert_eq!(location.first_tag("g").and_then(|t| t.value()), Some("9q8yy"));
    }

    #[test]
    fn test_fixture_gift_wrap() {
        let parties = multi_party_fixtures(2);
        let gift = parties[0].make_gift_wrap(&parties[1].public_key(), "psst");

        let msg = unwrap(&gift, &parties[1].keypair).unwrap();
        assert_eq!(msg.sender, parties[0].public_key());
        assert_eq!(msg.content, "psst");
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        // Each party has unique keys
        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);

        // Deterministic
        assert_eq!(multi_party_fixtures(3)[2].public_key(), pks[2]);
    }

    #[tokio::test]
    async fn test_fixture_messengers() {
        let network = MemoryNetwork::new();
        let parties = multi_party_fixtures(2);
        let alice = parties[0].messenger(&network).await;
        let bob = parties[1].messenger(&network).await;

        alice
            .send_private_message(&bob.public_key(), "over the wire")
            .await
            .unwrap();
        let msg = bob.next_message().await.unwrap().unwrap();
        assert_eq!(msg.content, "over the wire");
    }
}
