//! Transport abstraction for gift wraps.
//!
//! Outbound, a transport accepts nothing but a finished [`GiftWrap`], so an
//! unwrapped rumor or seal cannot be published by mistake. Inbound, it
//! delivers whatever raw events the network hands over; callers filter.
//! Implementations may use relays over WebSockets or anything else.

use async_trait::async_trait;
use thiserror::Error;

use veil_core::Event;
use veil_seal::GiftWrap;

/// Transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The remote end went away.
    #[error("transport disconnected")]
    Disconnected,

    /// Anything implementation-specific.
    #[error("transport error: {0}")]
    Other(String),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Transport trait for publishing and receiving events.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish a gift wrap.
    async fn publish(&self, wrap: GiftWrap) -> Result<()>;

    /// Receive the next raw inbound event.
    ///
    /// Returns `None` once the transport is closed.
    async fn recv(&self) -> Result<Option<Event>>;
}

/// A simple in-memory transport for testing.
///
/// Uses channels to simulate a relay: each identity has a mailbox, and wraps
/// are routed by their `p` tag.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{mpsc, Mutex, RwLock};
    use tracing::{debug, trace};
    use veil_core::PublicKey;

    /// Shared state for the memory transport network.
    #[derive(Default)]
    pub struct MemoryNetwork {
        /// Mailbox senders for each identity.
        mailboxes: RwLock<HashMap<PublicKey, mpsc::Sender<Event>>>,
    }

    impl MemoryNetwork {
        /// Create a new memory network.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Create a transport whose mailbox belongs to `identity`.
        pub async fn create_transport(self: &Arc<Self>, identity: PublicKey) -> MemoryTransport {
            let (tx, rx) = mpsc::channel(1000);

            self.mailboxes.write().await.insert(identity, tx);

            MemoryTransport {
                identity,
                network: Arc::clone(self),
                receiver: Mutex::new(rx),
            }
        }

        /// Push a raw event into one mailbox, as a relay would.
        pub async fn deliver(&self, to: &PublicKey, event: Event) -> Result<()> {
            let mailboxes = self.mailboxes.read().await;
            let sender = mailboxes
                .get(to)
                .ok_or_else(|| TransportError::Other("unknown recipient".into()))?;
            sender
                .send(event)
                .await
                .map_err(|_| TransportError::Disconnected)
        }

        /// Close a mailbox. Its transport sees `None` once drained.
        pub async fn disconnect(&self, identity: &PublicKey) -> bool {
            self.mailboxes.write().await.remove(identity).is_some()
        }

        /// Route a wrap to its tagged recipient, or to everyone but the
        /// sender when the tag names no known mailbox.
        async fn route(&self, from: &PublicKey, wrap: GiftWrap) -> Result<()> {
            let mailboxes = self.mailboxes.read().await;
            let target = wrap.recipient_tag().filter(|pk| mailboxes.contains_key(pk));
            let event = wrap.into_event();

            match target {
                Some(pk) => {
                    trace!(wrap_id = %event.id, "routing gift wrap by p tag");
                    if let Some(sender) = mailboxes.get(&pk) {
                        sender
                            .send(event)
                            .await
                            .map_err(|_| TransportError::Disconnected)?;
                    }
                }
                None => {
                    debug!(wrap_id = %event.id, "broadcasting gift wrap with unroutable p tag");
                    for (identity, sender) in mailboxes.iter() {
                        if identity != from {
                            // Ignore errors for broadcast (some mailboxes may be gone)
                            let _ = sender.send(event.clone()).await;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    /// In-memory transport implementation.
    pub struct MemoryTransport {
        identity: PublicKey,
        network: Arc<MemoryNetwork>,
        receiver: Mutex<mpsc::Receiver<Event>>,
    }

    impl MemoryTransport {
        pub fn identity(&self) -> PublicKey {
            self.identity
        }
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn publish(&self, wrap: GiftWrap) -> Result<()> {
            self.network.route(&self.identity, wrap).await
        }

        async fn recv(&self) -> Result<Option<Event>> {
            let mut rx = self.receiver.lock().await;
            Ok(rx.recv().await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryNetwork;
    use super::*;
    use veil_core::{EventBuilder, Keypair};
    use veil_seal::{wrap, wrap_with, RecipientTag, WrapOptions};

    #[tokio::test]
    async fn test_memory_transport_routes_by_p_tag() {
        let network = MemoryNetwork::new();
        let alice = Keypair::generate();
        let bob = Keypair::generate();
        let carol = Keypair::generate();

        let transport_a = network.create_transport(alice.public_key()).await;
        let transport_b = network.create_transport(bob.public_key()).await;
        let _transport_c = network.create_transport(carol.public_key()).await;

        let gift = wrap("hi", &alice, &bob.public_key()).unwrap();
        let id = gift.id;
        transport_a.publish(gift).await.unwrap();

        let received = transport_b.recv().await.unwrap().unwrap();
        assert_eq!(received.id, id);
    }

    #[tokio::test]
    async fn test_memory_transport_broadcasts_decoys() {
        let network = MemoryNetwork::new();
        let alice = Keypair::generate();
        let bob = Keypair::generate();
        let carol = Keypair::generate();

        let transport_a = network.create_transport(alice.public_key()).await;
        let transport_b = network.create_transport(bob.public_key()).await;
        let transport_c = network.create_transport(carol.public_key()).await;

        let opts = WrapOptions {
            recipient_tag: RecipientTag::Decoy(Keypair::generate().public_key()),
            ..WrapOptions::default()
        };
        let gift = wrap_with(
            "hi",
            &alice,
            &bob.public_key(),
            &opts,
            &mut rand::rngs::OsRng,
            veil_core::unix_now(),
        )
        .unwrap();
        transport_a.publish(gift).await.unwrap();

        assert!(transport_b.recv().await.unwrap().is_some());
        assert!(transport_c.recv().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deliver_raw_and_disconnect() {
        let network = MemoryNetwork::new();
        let bob = Keypair::generate();
        let transport_b = network.create_transport(bob.public_key()).await;

        let note = EventBuilder::text_note("public").sign(&bob);
        network.deliver(&bob.public_key(), note.clone()).await.unwrap();
        assert_eq!(transport_b.recv().await.unwrap(), Some(note));

        assert!(network.disconnect(&bob.public_key()).await);
        assert_eq!(transport_b.recv().await.unwrap(), None);
    }
}
