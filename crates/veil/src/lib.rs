//! # Veil
//!
//! The unified API for Veil: private messages that hide their metadata,
//! public location events, and staged feature rollout.
//!
//! ## Overview
//!
//! Veil provides a portable library for:
//!
//! - **Events**: Signed, content-addressed records with a canonical id
//! - **Gift wraps**: A rumor, sealed by its author, wrapped again by a
//!   single-use key so relays see neither sender nor true send time
//! - **Rollout**: Stable per-device feature buckets from a local seed
//!
//! ## Key Concepts
//!
//! - **Rumor**: The unsigned message. Never published on its own.
//! - **Seal**: The rumor encrypted to the recipient, signed by the sender.
//! - **GiftWrap**: The seal encrypted again from an ephemeral key. The only
//!   thing a [`Transport`] will publish.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veil::{Messenger, MessengerConfig};
//! use veil::core::Keypair;
//! use veil::store::SqliteStore;
//! use veil::transport::memory::MemoryNetwork;
//!
//! async fn example() {
//!     let network = MemoryNetwork::new();
//!
//!     let keypair = Keypair::generate();
//!     let transport = network.create_transport(keypair.public_key()).await;
//!     let store = SqliteStore::open("veil.db").unwrap();
//!
//!     let messenger = Messenger::new(keypair, store, transport, MessengerConfig::default());
//!
//!     let friend = Keypair::generate().public_key();
//!     let wrap_id = messenger
//!         .send_private_message(&friend, "hello")
//!         .await
//!         .unwrap();
//!
//!     if messenger.should_enable("read-receipts", 25.0).await.unwrap() {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `veil::core` - Events, keys, canonical ids, rollout buckets
//! - `veil::seal` - Encryption and the gift wrap pipeline
//! - `veil::store` - Local key-value storage and SQLite

pub mod error;
pub mod messenger;
pub mod rollout;
pub mod transport;

// Re-export component crates
pub use veil_core as core;
pub use veil_seal as seal;
pub use veil_store as store;

// Re-export main types for convenience
pub use error::{Result, VeilError};
pub use messenger::{Messenger, MessengerConfig, PrivateMessage};
pub use rollout::{RolloutGate, SEED_KEY};
pub use transport::{Transport, TransportError};

// Re-export commonly used core types
pub use veil_core::{
    Event, EventBuilder, EventId, EventKind, Keypair, PublicKey, SecretKey, Tag, Timestamp,
};
pub use veil_seal::{GiftWrap, RecipientTag, WrapOptions};
