//! End-to-end private messaging and rollout over real backends.

use std::sync::Arc;

use tempfile::TempDir;

use veil::core::rollout;
use veil::store::{KeyValueStore, MemoryStore, SqliteStore};
use veil::transport::memory::{MemoryNetwork, MemoryTransport};
use veil::{
    EventBuilder, EventKind, Keypair, Messenger, MessengerConfig, RecipientTag, RolloutGate,
    Transport, WrapOptions, SEED_KEY,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

async fn party(
    network: &Arc<MemoryNetwork>,
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

#[tokio::test]
async fn test_conversation_both_ways() {
    let network = MemoryNetwork::new();
    let alice = party(&network).await;
    let bob = party(&network).await;

    alice
        .send_private_message(&bob.public_key(), "are you there?")
        .await
        .unwrap();
    let msg = bob.next_message().await.unwrap().unwrap();
    assert_eq!(msg.sender, alice.public_key());
    assert_eq!(msg.content, "are you there?");

    bob.send_private_message(&msg.sender, "yes").await.unwrap();
    let reply = alice.next_message().await.unwrap().unwrap();
    assert_eq!(reply.sender, bob.public_key());
    assert_eq!(reply.content, "yes");
}

#[tokio::test]
async fn test_wire_hides_sender_and_time() {
    let network = MemoryNetwork::new();
    let alice = party(&network).await;
    let bob = party(&network).await;

    // Read bob's mailbox raw to see what a relay would.
    let before = veil::core::unix_now();
    let wrap_id = alice
        .send_private_message(&bob.public_key(), "secret plans")
        .await
        .unwrap();
    let raw = bob.transport().recv().await.unwrap().unwrap();

    assert_eq!(raw.id, wrap_id);
    assert_eq!(raw.kind, EventKind::GiftWrap);
    assert_ne!(raw.pubkey, alice.public_key());
    assert!(!raw.content.contains("secret plans"));
    assert!(raw.created_at <= before + 2);
    assert!(raw.created_at + 900 + 1 >= before);
    assert_eq!(raw.tag_values("p").collect::<Vec<_>>(), vec![bob.public_key().to_hex()]);

    let msg = bob.receive(&raw).unwrap();
    assert_eq!(msg.content, "secret plans");
    assert!(msg.created_at >= before);
}

#[tokio::test]
async fn test_decoy_tag_still_delivers() {
    let network = MemoryNetwork::new();
    let alice = party(&network).await;
    let bob = party(&network).await;
    let carol = party(&network).await;

    let options = WrapOptions {
        recipient_tag: RecipientTag::Decoy(Keypair::generate().public_key()),
        ..WrapOptions::default()
    };
    alice
        .send_private_message_with(&bob.public_key(), "psst", options)
        .await
        .unwrap();

    let msg = bob.next_message().await.unwrap().unwrap();
    assert_eq!(msg.content, "psst");

    // Carol got the broadcast too, but cannot open it.
    let raw = carol.transport().recv().await.unwrap().unwrap();
    assert_eq!(carol.receive(&raw), None);
}

#[tokio::test]
async fn test_next_message_skips_noise_and_ends_on_close() {
    init_tracing();
    let network = MemoryNetwork::new();
    let alice = party(&network).await;
    let bob = party(&network).await;
    let bob_pk = bob.public_key();

    // A public note and a tampered wrap arrive ahead of the real message.
    let note = EventBuilder::text_note("hello world").sign(&Keypair::generate());
    network.deliver(&bob_pk, note).await.unwrap();

    let mut tampered = veil::seal::wrap("forged", &Keypair::generate(), &bob_pk)
        .unwrap()
        .into_event();
    tampered.content.push('A');
    network.deliver(&bob_pk, tampered).await.unwrap();

    alice.send_private_message(&bob_pk, "real").await.unwrap();

    let msg = bob.next_message().await.unwrap().unwrap();
    assert_eq!(msg.content, "real");

    network.disconnect(&bob_pk).await;
    assert_eq!(bob.next_message().await.unwrap(), None);
}

#[tokio::test]
async fn test_rollout_seed_persists_across_restarts() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("veil.db");

    let (first_bucket, seed_hex) = {
        let gate = RolloutGate::new(SqliteStore::open(&path).unwrap());
        let bucket = gate.bucket("voice-notes").await.unwrap();
        let seed_hex = gate.seed().await.unwrap().to_hex();
        (bucket, seed_hex)
    };

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.get(SEED_KEY).await.unwrap(), Some(seed_hex));

    let gate = RolloutGate::new(store);
    assert_eq!(gate.bucket("voice-notes").await.unwrap(), first_bucket);
    assert!(first_bucket < rollout::BUCKETS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_on_sqlite() {
    let store = SqliteStore::open_memory().unwrap();
    let gate = Arc::new(RolloutGate::new(store.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        // Half share one gate, half race through their own.
        let shared = Arc::clone(&gate);
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let seed_hex = if i % 2 == 0 {
                shared.seed().await.unwrap().to_hex()
            } else {
                let own = RolloutGate::new(store);
                let seed_hex = own.seed().await.unwrap().to_hex();
                seed_hex
            };
            seed_hex
        }));
    }

    let mut seen = Vec::new();
    for h in handles {
        seen.push(h.await.unwrap());
    }
    seen.dedup();
    assert_eq!(seen.len(), 1);
    assert_eq!(store.get(SEED_KEY).await.unwrap(), Some(seen[0].clone()));
}

#[tokio::test]
async fn test_messenger_gates_features() {
    let network = MemoryNetwork::new();
    let alice = party(&network).await;

    assert!(!alice.should_enable("beta", 0.0).await.unwrap());
    assert!(alice.should_enable("beta", 100.0).await.unwrap());

    let seed = alice.rollout().seed().await.unwrap().clone();
    for pct in [10.0, 50.0, 90.0] {
        assert_eq!(
            alice.should_enable("beta", pct).await.unwrap(),
            rollout::should_enable(&seed, "beta", pct)
        );
    }
}
