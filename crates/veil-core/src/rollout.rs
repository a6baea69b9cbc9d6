//! Deterministic feature rollout buckets.
//!
//! A device holds one random seed. Hashing the seed with a feature name gives
//! a stable bucket in `0..10000`, so a feature at `pct` percent is on for a
//! device exactly when its bucket is below `pct * 100`. The seed never leaves
//! the device; only the boolean decision is observable.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of buckets.
pub const BUCKETS: u32 = 10_000;

/// A per-device rollout seed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RolloutSeed([u8; 32]);

impl RolloutSeed {
    /// Generate a fresh seed from the OS RNG.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// 64 lowercase hex characters, the persisted form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for RolloutSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RolloutSeed(<redacted>)")
    }
}

/// The bucket for a feature: the first four digest bytes, big-endian, mod 10000.
pub fn bucket(seed: &RolloutSeed, feature_id: &str) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(feature_id.as_bytes());
    let digest = hasher.finalize();
    let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    head % BUCKETS
}

/// Whether a feature at `pct` percent is enabled for this seed.
///
/// `pct` is clamped into `[0, 100]`; NaN counts as 0.
pub fn should_enable(seed: &RolloutSeed, feature_id: &str, pct: f64) -> bool {
    bucket(seed, feature_id) < threshold(pct)
}

/// Number of buckets enabled at `pct` percent.
pub fn threshold(pct: f64) -> u32 {
    let pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) };
    (pct / 100.0 * f64::from(BUCKETS)).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeds(n: usize) -> Vec<RolloutSeed> {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        (0..n).map(|_| RolloutSeed::generate_with_rng(&mut rng)).collect()
    }

    #[test]
    fn test_bucket_matches_digest_prefix() {
        let seed = RolloutSeed::from_bytes([7u8; 32]);
        let mut input = vec![7u8; 32];
        input.extend_from_slice(b"dark-mode");
        let digest = Sha256::digest(&input);
        let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        assert_eq!(bucket(&seed, "dark-mode"), head % 10_000);
    }

    #[test]
    fn test_threshold_clamps() {
        assert_eq!(threshold(0.0), 0);
        assert_eq!(threshold(100.0), 10_000);
        assert_eq!(threshold(-5.0), 0);
        assert_eq!(threshold(250.0), 10_000);
        assert_eq!(threshold(f64::NAN), 0);
        assert_eq!(threshold(f64::INFINITY), 10_000);
        assert_eq!(threshold(12.345), 1234);
    }

    #[test]
    fn test_zero_and_full_rollout() {
        for seed in seeds(100) {
            assert!(!should_enable(&seed, "feature", 0.0));
            assert!(should_enable(&seed, "feature", 100.0));
            assert!(!should_enable(&seed, "feature", -1.0));
            assert!(should_enable(&seed, "feature", 101.0));
        }
    }

    #[test]
    fn test_buckets_are_uniform() {
        let mut bins = [0u32; 10];
        for seed in seeds(1000) {
            bins[(bucket(&seed, "uniformity") / 1000) as usize] += 1;
        }
        let expected = 100.0;
        let chi2: f64 = bins
            .iter()
            .map(|&o| {
                let d = f64::from(o) - expected;
                d * d / expected
            })
            .sum();
        // df = 9, p = 0.001 critical value is 27.88
        assert!(chi2 < 30.0, "chi-squared {chi2} for bins {bins:?}");
    }

    #[test]
    fn test_half_rollout_ratio() {
        let enabled = seeds(1000)
            .iter()
            .filter(|s| should_enable(s, "half", 50.0))
            .count();
        let ratio = enabled as f64 / 1000.0;
        assert!((0.40..=0.60).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn test_seed_hex_roundtrip() {
        let seed = RolloutSeed::generate();
        let hex = seed.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(RolloutSeed::from_hex(&hex).unwrap(), seed);
        assert!(RolloutSeed::from_hex("zz").is_err());
    }

    #[test]
    fn test_seed_debug_redacted() {
        assert_eq!(format!("{:?}", RolloutSeed::from_bytes([1; 32])), "RolloutSeed(<redacted>)");
    }

    proptest! {
        #[test]
        fn prop_bucket_deterministic_and_bounded(bytes in any::<[u8; 32]>(), feature in ".*") {
            let seed = RolloutSeed::from_bytes(bytes);
            let b = bucket(&seed, &feature);
            prop_assert!(b < BUCKETS);
            prop_assert_eq!(b, bucket(&seed, &feature));
        }

        #[test]
        fn prop_enable_monotonic_in_pct(bytes in any::<[u8; 32]>(), lo in 0.0f64..100.0, step in 0.0f64..100.0) {
            let seed = RolloutSeed::from_bytes(bytes);
            if should_enable(&seed, "m", lo) {
                prop_assert!(should_enable(&seed, "m", lo + step));
            }
        }
    }
}
