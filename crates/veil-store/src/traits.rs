//! KeyValueStore trait: the abstract interface for local device state.
//!
//! Veil keeps very little on disk: a handful of string entries such as the
//! rollout seed. Implementations include SQLite (primary) and in-memory (for
//! tests).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Async interface for local string key-value persistence.
///
/// For SQLite, `spawn_blocking` is used internally to avoid blocking the
/// runtime.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Write `value` only if `key` is unset, as one atomic step.
    ///
    /// Returns the value stored after the call: `value` if this call wrote it,
    /// otherwise the value that was already there. Concurrent callers all
    /// observe the same winner.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<String>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key).await
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<String> {
        (**self).set_if_absent(key, value).await
    }
}
