//! Timestamp randomization for seals and gift wraps.
//!
//! Outer layers carry a created_at drawn uniformly around the true time so an
//! observer cannot line up a wrap with the moment it was sent.

use rand::rngs::OsRng;
use rand::Rng;

use veil_core::{unix_now, Timestamp};

/// Widest offset applied in either direction.
pub const MAX_JITTER_SECS: u64 = 900;

/// `now` shifted by a uniform offset in `[-900, +900]` seconds, floored at 0.
pub fn jittered_timestamp<R: Rng>(now: Timestamp, rng: &mut R) -> Timestamp {
    jittered_timestamp_within(now, MAX_JITTER_SECS, rng)
}

/// `now` shifted by a uniform offset in `[-max, +max]`. `max` is capped at
/// [`MAX_JITTER_SECS`].
pub fn jittered_timestamp_within<R: Rng>(now: Timestamp, max: u64, rng: &mut R) -> Timestamp {
    let max = max.min(MAX_JITTER_SECS) as i64;
    let offset: i64 = rng.gen_range(-max..=max);
    if offset < 0 {
        now.saturating_sub(offset.unsigned_abs())
    } else {
        now.saturating_add(offset as u64)
    }
}

/// The current time, jittered with OS randomness.
pub fn jittered_now() -> Timestamp {
    jittered_timestamp(unix_now(), &mut OsRng)
}
