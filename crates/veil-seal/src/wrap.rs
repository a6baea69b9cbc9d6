//! Rumor → Seal → GiftWrap, and back.
//!
//! ## Layers
//!
//! - **Rumor** (kind 14): the plaintext message with the sender's real key and
//!   the true time. Unsigned, so it is deniable if it ever leaks.
//! - **Seal** (kind 13): the rumor encrypted from sender to recipient, signed
//!   by the sender. Tags are empty so the recipient is not named.
//! - **GiftWrap** (kind 1059): the seal encrypted from a single-use key to the
//!   recipient, signed by that key. Only this layer crosses the network.
//!
//! Seal and wrap timestamps are jittered independently.

use std::ops::Deref;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::trace;
use zeroize::Zeroizing;

use veil_core::{
    unix_now, validate_event, CoreError, Event, EventId, EventKind, Keypair, PublicKey, Rumor,
    Tag, Timestamp, UnsignedEvent,
};

use crate::crypto::{AeadNonce, ConversationKey};
use crate::envelope::decrypt;
use crate::error::{EncryptionError, Result, SealError, UnwrapError};
use crate::jitter::{jittered_timestamp_within, MAX_JITTER_SECS};

/// A signed kind-1059 event. The only thing a transport will accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftWrap(Event);

impl GiftWrap {
    /// Accept an event only if it is kind 1059.
    pub fn new(event: Event) -> Result<Self> {
        if event.kind != EventKind::GiftWrap {
            return Err(SealError::WrongKind {
                expected: EventKind::GiftWrap.as_u32(),
                got: event.kind.as_u32(),
            });
        }
        Ok(Self(event))
    }

    pub fn event(&self) -> &Event {
        &self.0
    }

    pub fn into_event(self) -> Event {
        self.0
    }

    /// The public key named by the `p` tag, if it parses.
    pub fn recipient_tag(&self) -> Option<PublicKey> {
        self.0
            .tag_values("p")
            .next()
            .and_then(|hex| PublicKey::from_hex(hex).ok())
    }
}

impl Deref for GiftWrap {
    type Target = Event;

    fn deref(&self) -> &Event {
        &self.0
    }
}

impl TryFrom<Event> for GiftWrap {
    type Error = SealError;

    fn try_from(event: Event) -> Result<Self> {
        Self::new(event)
    }
}

impl From<GiftWrap> for Event {
    fn from(wrap: GiftWrap) -> Self {
        wrap.0
    }
}

/// Which key the outer `p` tag names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipientTag {
    /// The real recipient. Required for relay routing.
    #[default]
    Recipient,
    /// Some other key, to hide the recipient from the relay.
    Decoy(PublicKey),
}

/// Knobs for one wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    pub recipient_tag: RecipientTag,
    /// Timestamp jitter window. Capped at [`MAX_JITTER_SECS`].
    pub max_jitter_secs: u64,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            recipient_tag: RecipientTag::Recipient,
            max_jitter_secs: MAX_JITTER_SECS,
        }
    }
}

/// A private message recovered from a gift wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrappedMessage {
    /// The seal's signer, which is also the rumor's author.
    pub sender: PublicKey,
    pub content: String,
    /// The rumor's true send time.
    pub created_at: Timestamp,
    pub rumor_id: EventId,
}

/// Build the kind-14 rumor: true time, no tags, no signature.
pub fn create_rumor(sender: PublicKey, content: &str, now: Timestamp) -> Rumor {
    Rumor::new(UnsignedEvent::new(
        sender,
        now,
        EventKind::DirectMessage,
        Vec::new(),
        content,
    ))
}

/// Encrypt a rumor to the recipient and sign it with the sender's real key.
///
/// Nonce, jitter and signing randomness all come from `rng`. Outside tests
/// pass `OsRng`; a seeded RNG is only for reproducible test fixtures.
pub fn create_seal<R: RngCore + CryptoRng>(
    rumor: &Rumor,
    sender: &Keypair,
    recipient: &PublicKey,
    rng: &mut R,
    now: Timestamp,
) -> Result<Event> {
    seal_within(rumor, sender, recipient, rng, now, MAX_JITTER_SECS)
}

/// Encrypt a seal from a fresh single-use key and sign with that key.
///
/// The single-use key is drawn from `rng`, so a seeded RNG here is for test
/// fixtures only. Senders go through [`wrap`] or [`wrap_with`] with `OsRng`.
pub fn create_gift_wrap<R: RngCore + CryptoRng>(
    seal: &Event,
    recipient: &PublicKey,
    p_tag: RecipientTag,
    rng: &mut R,
    now: Timestamp,
) -> Result<GiftWrap> {
    gift_wrap_within(seal, recipient, p_tag, rng, now, MAX_JITTER_SECS)
}

/// Wrap a private message with OS randomness and the system clock.
pub fn wrap(content: &str, sender: &Keypair, recipient: &PublicKey) -> Result<GiftWrap> {
    wrap_with(
        content,
        sender,
        recipient,
        &WrapOptions::default(),
        &mut OsRng,
        unix_now(),
    )
}

/// Wrap with explicit options, randomness and clock.
///
/// The rumor and the single-use key never outlive this call. Production
/// callers pass `OsRng`; seeded RNGs and fixed clocks are test hooks.
pub fn wrap_with<R: RngCore + CryptoRng>(
    content: &str,
    sender: &Keypair,
    recipient: &PublicKey,
    options: &WrapOptions,
    rng: &mut R,
    now: Timestamp,
) -> Result<GiftWrap> {
    let rumor = create_rumor(sender.public_key(), content, now);
    let seal = seal_within(&rumor, sender, recipient, rng, now, options.max_jitter_secs)?;
    drop(rumor);
    gift_wrap_within(
        &seal,
        recipient,
        options.recipient_tag,
        rng,
        now,
        options.max_jitter_secs,
    )
}

fn seal_within<R: RngCore + CryptoRng>(
    rumor: &Rumor,
    sender: &Keypair,
    recipient: &PublicKey,
    rng: &mut R,
    now: Timestamp,
    max_jitter: u64,
) -> Result<Event> {
    let plaintext = Zeroizing::new(rumor.to_json().map_err(CoreError::from)?);
    let content = encrypt_with_rng(&plaintext, sender, recipient, rng)?;
    let created_at = jittered_timestamp_within(now, max_jitter, rng);

    let unsigned = UnsignedEvent::new(
        sender.public_key(),
        created_at,
        EventKind::Seal,
        Vec::new(),
        content,
    );
    Ok(unsigned.sign_with_aux(sender, &aux_rand(rng)))
}

fn gift_wrap_within<R: RngCore + CryptoRng>(
    seal: &Event,
    recipient: &PublicKey,
    p_tag: RecipientTag,
    rng: &mut R,
    now: Timestamp,
    max_jitter: u64,
) -> Result<GiftWrap> {
    if seal.kind != EventKind::Seal {
        return Err(SealError::WrongKind {
            expected: EventKind::Seal.as_u32(),
            got: seal.kind.as_u32(),
        });
    }

    let ephemeral = Keypair::generate_with_rng(rng);
    let plaintext = Zeroizing::new(seal.to_json().map_err(CoreError::from)?);
    let content = encrypt_with_rng(&plaintext, &ephemeral, recipient, rng)?;
    let created_at = jittered_timestamp_within(now, max_jitter, rng);

    let tagged = match p_tag {
        RecipientTag::Recipient => recipient,
        RecipientTag::Decoy(ref decoy) => decoy,
    };
    let unsigned = UnsignedEvent::new(
        ephemeral.public_key(),
        created_at,
        EventKind::GiftWrap,
        vec![Tag::pubkey(tagged)],
        content,
    );
    GiftWrap::new(unsigned.sign_with_aux(&ephemeral, &aux_rand(rng)))
}

fn encrypt_with_rng<R: RngCore + CryptoRng>(
    plaintext: &str,
    local: &Keypair,
    remote: &PublicKey,
    rng: &mut R,
) -> std::result::Result<String, EncryptionError> {
    let key = ConversationKey::derive(&local.secret_key(), remote)?;
    let nonce = AeadNonce::generate_with_rng(rng);
    Ok(key.seal(plaintext, &nonce)?.encode())
}

fn aux_rand<R: RngCore + CryptoRng>(rng: &mut R) -> [u8; 32] {
    let mut aux = [0u8; 32];
    rng.fill_bytes(&mut aux);
    aux
}

/// Open a gift wrap addressed to `recipient`.
///
/// Every failure returns the same [`UnwrapError`]; the cause is only traced.
pub fn unwrap(
    event: &Event,
    recipient: &Keypair,
) -> std::result::Result<UnwrappedMessage, UnwrapError> {
    unwrap_with(event, recipient, true)
}

/// Open a gift wrap, optionally skipping the outer signature check.
///
/// The outer id, the seal's id and signature, and the rumor's id are always
/// checked.
pub fn unwrap_with(
    event: &Event,
    recipient: &Keypair,
    verify_wrap_signature: bool,
) -> std::result::Result<UnwrappedMessage, UnwrapError> {
    open_layers(event, recipient, verify_wrap_signature).map_err(|reason| {
        trace!(wrap_id = %event.id, reason, "dropping gift wrap");
        UnwrapError
    })
}

fn open_layers(
    wrap: &Event,
    recipient: &Keypair,
    verify_wrap_signature: bool,
) -> std::result::Result<UnwrappedMessage, &'static str> {
    if wrap.kind != EventKind::GiftWrap {
        return Err("outer event is not a gift wrap");
    }
    if verify_wrap_signature {
        validate_event(wrap).map_err(|_| "gift wrap failed validation")?;
    } else if wrap.compute_id() != wrap.id {
        return Err("gift wrap id mismatch");
    }

    let secret = recipient.secret_key();

    let seal_json = Zeroizing::new(
        decrypt(&wrap.content, &secret, &wrap.pubkey).map_err(|_| "gift wrap did not decrypt")?,
    );
    let seal = Event::from_json(&seal_json).map_err(|_| "seal is malformed")?;
    if seal.kind != EventKind::Seal {
        return Err("inner event is not a seal");
    }
    if !seal.tags.is_empty() {
        return Err("seal carries tags");
    }
    validate_event(&seal).map_err(|_| "seal failed validation")?;

    let rumor_json = Zeroizing::new(
        decrypt(&seal.content, &secret, &seal.pubkey).map_err(|_| "seal did not decrypt")?,
    );
    let rumor = Rumor::from_json(&rumor_json).map_err(|_| "rumor is malformed")?;
    if rumor.kind() != EventKind::DirectMessage {
        return Err("inner event is not a private message");
    }
    if *rumor.pubkey() != seal.pubkey {
        return Err("rumor author does not match seal signer");
    }

    Ok(UnwrappedMessage {
        sender: seal.pubkey,
        content: rumor.content().to_string(),
        created_at: rumor.created_at(),
        rumor_id: rumor.id(),
    })
}
