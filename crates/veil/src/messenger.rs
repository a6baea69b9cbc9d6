//! The Messenger: unified API for Veil.
//!
//! The Messenger brings together an identity, local storage and a transport
//! into a cohesive interface for private messaging and location events.

use rand::rngs::OsRng;
use tracing::{debug, trace};

use veil_core::{unix_now, Event, EventBuilder, EventId, EventKind, Keypair, PublicKey, Timestamp};
use veil_seal::{unwrap_with, wrap_with, UnwrappedMessage, WrapOptions, MAX_JITTER_SECS};
use veil_store::KeyValueStore;

use crate::error::Result;
use crate::rollout::RolloutGate;
use crate::transport::Transport;

/// Configuration for the Messenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessengerConfig {
    /// Whether to check the outer gift wrap signature on receive.
    pub verify_wrap_signature: bool,
    /// Timestamp jitter window for outgoing wraps, in seconds.
    ///
    /// Values above [`MAX_JITTER_SECS`] are clamped.
    pub jitter_secs: u64,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            verify_wrap_signature: true,
            jitter_secs: MAX_JITTER_SECS,
        }
    }
}

impl MessengerConfig {
    /// Wrap options for a send with the real recipient tagged.
    pub fn wrap_options(&self) -> WrapOptions {
        WrapOptions {
            max_jitter_secs: self.jitter_secs.min(MAX_JITTER_SECS),
            ..WrapOptions::default()
        }
    }
}

/// A private message received through the Messenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateMessage {
    /// Id of the gift wrap it arrived in.
    pub wrap_id: EventId,
    /// Id of the inner rumor. Stable across re-wraps of the same message.
    pub rumor_id: EventId,
    pub sender: PublicKey,
    pub content: String,
    /// The true send time, not the jittered wrap time.
    pub created_at: Timestamp,
}

impl PrivateMessage {
    fn from_unwrapped(wrap_id: EventId, msg: UnwrappedMessage) -> Self {
        Self {
            wrap_id,
            rumor_id: msg.rumor_id,
            sender: msg.sender,
            content: msg.content,
            created_at: msg.created_at,
        }
    }
}

/// The main Messenger struct.
///
/// Provides a unified API for:
/// - Sending and receiving gift-wrapped private messages
/// - Signing public location messages
/// - Gating features on a persistent device seed
pub struct Messenger<S: KeyValueStore, T: Transport> {
    /// The identity keypair for this messenger instance.
    keypair: Keypair,
    /// Feature gate, which owns the store.
    rollout: RolloutGate<S>,
    /// Outbound and inbound events.
    transport: T,
    /// Configuration.
    config: MessengerConfig,
}

impl<S: KeyValueStore, T: Transport> Messenger<S, T> {
    /// Create a new messenger instance.
    pub fn new(keypair: Keypair, store: S, transport: T, config: MessengerConfig) -> Self {
        Self {
            keypair,
            rollout: RolloutGate::new(store),
            transport,
            config,
        }
    }

    /// Get the messenger's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// The public key as `npub1…` text.
    pub fn npub(&self) -> Result<String> {
        Ok(self.keypair.to_npub()?)
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        self.rollout.store()
    }

    /// Get the transport reference.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &MessengerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private Messages
    // ─────────────────────────────────────────────────────────────────────────

    /// Wrap `content` for `recipient` and publish it.
    ///
    /// Returns the id of the published gift wrap.
    pub async fn send_private_message(
        &self,
        recipient: &PublicKey,
        content: &str,
    ) -> Result<EventId> {
        self.send_private_message_with(recipient, content, self.config.wrap_options())
            .await
    }

    /// Same as [`send_private_message`](Self::send_private_message) with
    /// explicit wrap options.
    pub async fn send_private_message_with(
        &self,
        recipient: &PublicKey,
        content: &str,
        options: WrapOptions,
    ) -> Result<EventId> {
        let gift = wrap_with(
            content,
            &self.keypair,
            recipient,
            &options,
            &mut OsRng,
            unix_now(),
        )?;
        let wrap_id = gift.id;

        self.transport.publish(gift).await?;
        debug!(%wrap_id, "published gift wrap");
        Ok(wrap_id)
    }

    /// Turn an inbound raw event into a private message.
    ///
    /// Anything that is not a gift wrap for this identity yields `None`.
    pub fn receive(&self, event: &Event) -> Option<PrivateMessage> {
        if event.kind != EventKind::GiftWrap {
            trace!(event_id = %event.id, kind = event.kind.as_u32(), "ignoring non gift wrap event");
            return None;
        }

        // Failures are traced inside unwrap_with.
        unwrap_with(event, &self.keypair, self.config.verify_wrap_signature)
            .ok()
            .map(|msg| PrivateMessage::from_unwrapped(event.id, msg))
    }

    /// Pull from the transport until a message unwraps.
    ///
    /// Returns `None` once the transport is closed.
    pub async fn next_message(&self) -> Result<Option<PrivateMessage>> {
        while let Some(event) = self.transport.recv().await? {
            if let Some(msg) = self.receive(&event) {
                return Ok(Some(msg));
            }
        }
        Ok(None)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Public Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign a kind-20000 location message.
    ///
    /// The event is returned for a public channel; the gift wrap transport
    /// never carries it.
    pub fn location_message(
        &self,
        content: &str,
        geohash: &str,
        nickname: &str,
        teleported: bool,
    ) -> Result<Event> {
        let builder = EventBuilder::location_message(content, geohash, nickname, teleported)?;
        Ok(builder.sign(&self.keypair))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rollout
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `feature` at `pct` percent is on for this device.
    pub async fn should_enable(&self, feature: &str, pct: f64) -> Result<bool> {
        self.rollout.should_enable(feature, pct).await
    }

    pub fn rollout(&self) -> &RolloutGate<S> {
        &self.rollout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::{MemoryNetwork, MemoryTransport};
    use proptest::prelude::*;
    use veil_store::MemoryStore;

    async fn messenger(
        network: &std::sync::Arc<MemoryNetwork>,
    ) -> Messenger<MemoryStore, MemoryTransport> {
        let keypair = Keypair::generate();
        let transport = network.create_transport(keypair.public_key()).await;
        Messenger::new(
            keypair,
            MemoryStore::new(),
            transport,
            MessengerConfig::default(),
        )
    }

    #[test]
    fn test_config_clamps_jitter() {
        let config = MessengerConfig {
            jitter_secs: 10_000,
            ..MessengerConfig::default()
        };
        assert_eq!(config.wrap_options().max_jitter_secs, MAX_JITTER_SECS);

        let config = MessengerConfig {
            jitter_secs: 60,
            ..MessengerConfig::default()
        };
        assert_eq!(config.wrap_options().max_jitter_secs, 60);
    }

    proptest! {
        #[test]
        fn test_jitter_never_exceeds_cap(jitter_secs in any::<u64>(), verify in any::<bool>()) {
            let config = MessengerConfig { verify_wrap_signature: verify, jitter_secs };
            let options = config.wrap_options();
            prop_assert!(options.max_jitter_secs <= MAX_JITTER_SECS);
            prop_assert_eq!(options.recipient_tag, veil_seal::RecipientTag::Recipient);
        }
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let network = MemoryNetwork::new();
        let alice = messenger(&network).await;
        let bob = messenger(&network).await;

        let wrap_id = alice
            .send_private_message(&bob.public_key(), "hello bob")
            .await
            .unwrap();

        let msg = bob.next_message().await.unwrap().unwrap();
        assert_eq!(msg.wrap_id, wrap_id);
        assert_eq!(msg.sender, alice.public_key());
        assert_eq!(msg.content, "hello bob");
    }

    #[tokio::test]
    async fn test_receive_ignores_other_kinds() {
        let network = MemoryNetwork::new();
        let bob = messenger(&network).await;

        let note = EventBuilder::text_note("public").sign(&Keypair::generate());
        assert_eq!(bob.receive(&note), None);

        let unknown = EventBuilder::new(EventKind::Unknown(31337)).sign(&Keypair::generate());
        assert_eq!(bob.receive(&unknown), None);
    }

    #[tokio::test]
    async fn test_location_message() {
        let network = MemoryNetwork::new();
        let alice = messenger(&network).await;

        let event = alice
            .location_message("hi", "u4pruyd", "alice", false)
            .unwrap();
        assert_eq!(event.kind, EventKind::LocationMessage);
        assert_eq!(event.pubkey, alice.public_key());
        assert!(veil_core::validate_event(&event).is_ok());

        assert!(alice.location_message("hi", "", "alice", false).is_err());
    }
}
