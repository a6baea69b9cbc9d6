//! # Veil Store
//!
//! Local key-value storage for Veil. Provides a trait-based interface with
//! SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! Veil persists almost nothing: private messages only exist as gift wraps
//! held by the transport. What remains is small device state, such as the
//! rollout seed, kept behind the [`KeyValueStore`] trait.
//!
//! ## Key Types
//!
//! - [`KeyValueStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veil_store::{KeyValueStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("veil.db").unwrap();
//!
//!     // Atomic get-or-create
//!     let value = store.set_if_absent("device.name", "laptop").await.unwrap();
//!     assert_eq!(value, "laptop");
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic create**: `set_if_absent` never overwrites and reports the winner
//! - **Migrations**: SQLite schema is versioned in `schema_migrations`

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::KeyValueStore;
