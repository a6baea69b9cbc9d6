//! Events: the signed, content-addressed unit every peer exchanges.
//!
//! An event is immutable once signed. Its id is the SHA-256 of the canonical
//! preimage and its signature is over that id.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::canonical::canonical_event;
use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::{SignatureError, ValidationError};
use crate::types::{unix_now, EventId, Timestamp};

/// Start of the ephemeral kind range (inclusive).
pub const EPHEMERAL_MIN: u32 = 20000;

/// End of the ephemeral kind range (inclusive).
pub const EPHEMERAL_MAX: u32 = 29999;

/// Longest geohash accepted on a location channel.
pub const MAX_GEOHASH_LEN: usize = 12;

const GEOHASH_ALPHABET: &str = "0123456789bcdefghjkmnpqrstuvwxyz";

/// The kind of an event, keyed by the integer on the wire.
///
/// Conversion to and from `u32` is lossless: kinds without a named variant
/// are kept as [`EventKind::Ephemeral`] or [`EventKind::Unknown`].
///
/// Equality and hashing go through the wire integer, so a hand-built
/// `Unknown(1059)` is the same kind as [`EventKind::GiftWrap`]. Prefer
/// [`EventKind::from_u32`] when building from a number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum EventKind {
    /// Profile metadata (0).
    Metadata,
    /// Public text note (1).
    TextNote,
    /// Signed, encrypted rumor (13).
    Seal,
    /// Private message rumor (14). Never sent unwrapped.
    DirectMessage,
    /// Outer envelope for a seal (1059).
    GiftWrap,
    /// Geohash channel message (20000).
    LocationMessage,
    /// Any other kind in 20000..=29999.
    Ephemeral(u32),
    /// Anything else. Passed through unchanged.
    Unknown(u32),
}

impl EventKind {
    /// The integer kind on the wire.
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Metadata => 0,
            Self::TextNote => 1,
            Self::Seal => 13,
            Self::DirectMessage => 14,
            Self::GiftWrap => 1059,
            Self::LocationMessage => 20000,
            Self::Ephemeral(n) | Self::Unknown(n) => n,
        }
    }

    /// Map a wire integer onto its variant.
    pub const fn from_u32(n: u32) -> Self {
        match n {
            0 => Self::Metadata,
            1 => Self::TextNote,
            13 => Self::Seal,
            14 => Self::DirectMessage,
            1059 => Self::GiftWrap,
            20000 => Self::LocationMessage,
            EPHEMERAL_MIN..=EPHEMERAL_MAX => Self::Ephemeral(n),
            n => Self::Unknown(n),
        }
    }

    /// Relays are not expected to store ephemeral events.
    pub const fn is_ephemeral(self) -> bool {
        let n = self.as_u32();
        n >= EPHEMERAL_MIN && n <= EPHEMERAL_MAX
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.as_u32() == other.as_u32()
    }
}

impl Eq for EventKind {}

impl std::hash::Hash for EventKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_u32().hash(state);
    }
}

impl From<u32> for EventKind {
    fn from(n: u32) -> Self {
        Self::from_u32(n)
    }
}

impl From<EventKind> for u32 {
    fn from(kind: EventKind) -> Self {
        kind.as_u32()
    }
}

/// One tag: an ordered list of strings, the first being its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(pub Vec<String>);

impl Tag {
    /// Build a tag from any list of strings.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(items.into_iter().map(Into::into).collect())
    }

    /// `["p", <pubkey>]`: a recipient or decoy.
    pub fn pubkey(pubkey: &PublicKey) -> Self {
        Self(vec!["p".into(), pubkey.to_hex()])
    }

    /// `["g", <geohash>]`: a location channel.
    pub fn geohash(geohash: &str) -> Self {
        Self(vec!["g".into(), geohash.into()])
    }

    /// `["n", <nickname>]`.
    pub fn nickname(nickname: &str) -> Self {
        Self(vec!["n".into(), nickname.into()])
    }

    /// `["t", "teleport"]`.
    pub fn teleport() -> Self {
        Self(vec!["t".into(), "teleport".into()])
    }

    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// The preimage fields of an event, before id and signature exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedEvent {
    pub pubkey: PublicKey,
    pub created_at: Timestamp,
    pub kind: EventKind,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl UnsignedEvent {
    pub fn new(
        pubkey: PublicKey,
        created_at: Timestamp,
        kind: EventKind,
        tags: Vec<Tag>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            pubkey,
            created_at,
            kind,
            tags,
            content: content.into(),
        }
    }

    /// The canonical preimage.
    pub fn canonical(&self) -> String {
        canonical_event(self)
    }

    /// The content-addressed id.
    pub fn id(&self) -> EventId {
        EventId::compute(self)
    }

    /// Sign with fresh auxiliary randomness.
    ///
    /// The keypair must own `self.pubkey`, otherwise the result will not verify.
    pub fn sign(self, keypair: &Keypair) -> Event {
        let id = self.id();
        let sig = keypair.sign(&id);
        self.into_event(id, sig)
    }

    /// Sign with explicit auxiliary randomness.
    ///
    /// `aux` must be fresh CSPRNG output. A fixed value is for test vectors only.
    #[doc(hidden)]
    pub fn sign_with_aux(self, keypair: &Keypair, aux: &[u8; 32]) -> Event {
        let id = self.id();
        let sig = keypair.sign_with_aux(&id, aux);
        self.into_event(id, sig)
    }

    fn into_event(self, id: EventId, sig: Signature) -> Event {
        Event {
            id,
            pubkey: self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig,
        }
    }
}

impl EventId {
    /// Hash the canonical preimage of an event.
    pub fn compute(event: &UnsignedEvent) -> Self {
        Self::from_canonical(&canonical_event(event))
    }
}

/// A complete, signed event as it appears on the wire.
///
/// Deserializing through serde only checks field types. Use
/// [`Event::from_json`] for inbound text and [`crate::validate_event`] before
/// trusting the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub pubkey: PublicKey,
    pub created_at: Timestamp,
    pub kind: EventKind,
    pub tags: Vec<Tag>,
    pub content: String,
    pub sig: Signature,
}

impl Event {
    /// Recompute the id from the preimage fields.
    pub fn compute_id(&self) -> EventId {
        EventId::from_canonical(&crate::canonical::canonical_json(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        ))
    }

    /// Compact wire JSON, fields in id, pubkey, created_at, kind, tags,
    /// content, sig order.
    pub fn to_json(&self) -> Result<String, ValidationError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Strip the id and signature.
    pub fn unsigned(&self) -> UnsignedEvent {
        UnsignedEvent {
            pubkey: self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags.clone(),
            content: self.content.clone(),
        }
    }

    /// Values (second element) of every tag with this name.
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.name() == Some(name))
            .filter_map(Tag::value)
    }

    /// The first tag with this name.
    pub fn first_tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name() == Some(name))
    }
}

/// An unsigned private message, only ever transmitted inside a seal.
///
/// The id always matches the canonical hash of the fields. Content is wiped
/// when the rumor is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rumor {
    id: EventId,
    event: UnsignedEvent,
}

impl Rumor {
    /// Compute the id and wrap.
    pub fn new(event: UnsignedEvent) -> Self {
        let id = event.id();
        Self { id, event }
    }

    /// Accept a stated id only if it matches the canonical hash.
    pub fn from_parts(id: EventId, event: UnsignedEvent) -> Result<Self, SignatureError> {
        if event.id() != id {
            return Err(SignatureError::IdMismatch);
        }
        Ok(Self { id, event })
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn pubkey(&self) -> &PublicKey {
        &self.event.pubkey
    }

    pub fn created_at(&self) -> Timestamp {
        self.event.created_at
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind
    }

    pub fn tags(&self) -> &[Tag] {
        &self.event.tags
    }

    pub fn content(&self) -> &str {
        &self.event.content
    }

    /// Compact wire JSON, without a `sig` field.
    pub fn to_json(&self) -> Result<String, ValidationError> {
        Ok(serde_json::to_string(&RumorJson {
            id: self.id,
            pubkey: &self.event.pubkey,
            created_at: self.event.created_at,
            kind: self.event.kind,
            tags: &self.event.tags,
            content: &self.event.content,
        })?)
    }
}

#[derive(Serialize)]
struct RumorJson<'a> {
    id: EventId,
    pubkey: &'a PublicKey,
    created_at: Timestamp,
    kind: EventKind,
    tags: &'a [Tag],
    content: &'a str,
}

impl Drop for Rumor {
    fn drop(&mut self) {
        self.event.content.zeroize();
    }
}

/// Builder for public events.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    kind: EventKind,
    tags: Vec<Tag>,
    content: String,
    created_at: Option<Timestamp>,
}

impl EventBuilder {
    /// Start building an event of the given kind.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            tags: Vec::new(),
            content: String::new(),
            created_at: None,
        }
    }

    /// A kind 1 text note.
    pub fn text_note(content: impl Into<String>) -> Self {
        Self::new(EventKind::TextNote).content(content)
    }

    /// A kind 0 profile metadata event. `json` is the metadata object as text.
    pub fn metadata(json: impl Into<String>) -> Self {
        Self::new(EventKind::Metadata).content(json)
    }

    /// A kind 20000 message on a geohash channel.
    pub fn location_message(
        content: impl Into<String>,
        geohash: &str,
        nickname: &str,
        teleported: bool,
    ) -> Result<Self, ValidationError> {
        validate_geohash(geohash)?;
        let mut builder = Self::new(EventKind::LocationMessage)
            .content(content)
            .tag(Tag::geohash(geohash))
            .tag(Tag::nickname(nickname));
        if teleported {
            builder = builder.tag(Tag::teleport());
        }
        Ok(builder)
    }

    /// Append a tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Append several tags.
    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Set the content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the timestamp. Defaults to the current time.
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Finish without signing.
    pub fn build(self, pubkey: PublicKey) -> UnsignedEvent {
        UnsignedEvent {
            pubkey,
            created_at: self.created_at.unwrap_or_else(unix_now),
            kind: self.kind,
            tags: self.tags,
            content: self.content,
        }
    }

    /// Finish and sign with the keypair's own public key.
    pub fn sign(self, keypair: &Keypair) -> Event {
        self.build(keypair.public_key()).sign(keypair)
    }
}

/// Geohashes are 1 to 12 characters of the geohash base32 alphabet.
pub fn validate_geohash(geohash: &str) -> Result<(), ValidationError> {
    let ok = !geohash.is_empty()
        && geohash.len() <= MAX_GEOHASH_LEN
        && geohash.chars().all(|c| GEOHASH_ALPHABET.contains(c));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidGeohash(geohash.to_string()))
    }
}
