//! Persistent rollout seed and feature gating.
//!
//! The seed is created once per device and kept in the local store. After
//! that, every gating decision is a pure function of the seed and the feature
//! name (see [`veil_core::rollout`]).

use tokio::sync::OnceCell;
use tracing::{debug, info};

use veil_core::rollout::{self, RolloutSeed};
use veil_store::{KeyValueStore, StoreError};

use crate::error::Result;

/// Store key holding the seed as 64 hex characters.
pub const SEED_KEY: &str = "rollout.seed";

/// Feature gate backed by a persistent device seed.
pub struct RolloutGate<S: KeyValueStore> {
    store: S,
    seed: OnceCell<RolloutSeed>,
}

impl<S: KeyValueStore> RolloutGate<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            seed: OnceCell::new(),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The device seed, created and persisted on first use.
    ///
    /// Concurrent callers, in this process or through another gate on the
    /// same store, all observe the same seed. A stored value that is not a
    /// valid seed is an error and is left untouched.
    pub async fn seed(&self) -> Result<&RolloutSeed> {
        self.seed.get_or_try_init(|| self.load_or_create()).await
    }

    /// Bucket of `feature` in `0..10000`.
    pub async fn bucket(&self, feature: &str) -> Result<u32> {
        Ok(rollout::bucket(self.seed().await?, feature))
    }

    /// Whether `feature` at `pct` percent is on for this device.
    pub async fn should_enable(&self, feature: &str, pct: f64) -> Result<bool> {
        Ok(rollout::should_enable(self.seed().await?, feature, pct))
    }

    async fn load_or_create(&self) -> Result<RolloutSeed> {
        if let Some(stored) = self.store.get(SEED_KEY).await? {
            debug!("loaded rollout seed");
            return parse_seed(&stored);
        }

        let fresh = RolloutSeed::generate();
        let fresh_hex = fresh.to_hex();
        let stored = self.store.set_if_absent(SEED_KEY, &fresh_hex).await?;
        if stored == fresh_hex {
            info!("created rollout seed");
            Ok(fresh)
        } else {
            debug!("rollout seed created concurrently");
            parse_seed(&stored)
        }
    }
}

fn parse_seed(stored: &str) -> Result<RolloutSeed> {
    RolloutSeed::from_hex(stored).map_err(|e| {
        StoreError::InvalidData(format!("malformed rollout seed: {}", e)).into()
    })
}
