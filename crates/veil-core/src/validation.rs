//! Event validation: structural checks on inbound JSON and signature checks.

use serde_json::{Map, Value};

use crate::crypto::{PublicKey, Signature};
use crate::error::{CoreError, SignatureError, ValidationError};
use crate::event::{Event, EventKind, Rumor, Tag, UnsignedEvent};
use crate::types::EventId;

/// Verify an event's id and signature.
///
/// This performs:
/// - Id recomputation from the canonical preimage
/// - Comparison against the stated id
/// - BIP-340 verification of `sig` over the id under `pubkey`
pub fn validate_event(event: &Event) -> Result<(), SignatureError> {
    if event.compute_id() != event.id {
        return Err(SignatureError::IdMismatch);
    }
    event.pubkey.verify_strict(&event.id, &event.sig)
}

/// Convert an untyped JSON value into an [`Event`].
///
/// Only the shape is checked here. Call [`validate_event`] before trusting it.
pub fn event_from_value(value: &Value) -> Result<Event, ValidationError> {
    let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let id = EventId(hex_field::<32>(obj, "id")?);
    let sig = Signature(hex_field::<64>(obj, "sig")?);
    let unsigned = unsigned_from_object(obj)?;

    Ok(Event {
        id,
        pubkey: unsigned.pubkey,
        created_at: unsigned.created_at,
        kind: unsigned.kind,
        tags: unsigned.tags,
        content: unsigned.content,
        sig,
    })
}

/// Convert an untyped JSON value into a [`Rumor`]. A `sig` field, if any, is ignored.
pub fn rumor_from_value(value: &Value) -> Result<Rumor, CoreError> {
    let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let id = EventId(hex_field::<32>(obj, "id")?);
    let unsigned = unsigned_from_object(obj)?;
    Ok(Rumor::from_parts(id, unsigned)?)
}

impl Event {
    /// Parse wire JSON, checking every field's type and encoding.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(text)?;
        event_from_value(&value)
    }
}

impl Rumor {
    /// Parse wire JSON. The stated id must match the canonical hash.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(text).map_err(ValidationError::from)?;
        rumor_from_value(&value)
    }
}

/// Extract the preimage fields from an event object.
pub(crate) fn unsigned_from_object(obj: &Map<String, Value>) -> Result<UnsignedEvent, ValidationError> {
    let pubkey = PublicKey(hex_field::<32>(obj, "pubkey")?);

    let created_at = field(obj, "created_at")?
        .as_u64()
        .ok_or(ValidationError::InvalidCreatedAt)?;

    let kind = field(obj, "kind")?
        .as_u64()
        .and_then(|k| u32::try_from(k).ok())
        .map(EventKind::from_u32)
        .ok_or(ValidationError::InvalidKind)?;

    let tags = parse_tags(field(obj, "tags")?)?;

    let content = field(obj, "content")?
        .as_str()
        .ok_or(ValidationError::InvalidContent)?
        .to_string();

    Ok(UnsignedEvent {
        pubkey,
        created_at,
        kind,
        tags,
        content,
    })
}

fn field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, ValidationError> {
    obj.get(name).ok_or(ValidationError::MissingField(name))
}

fn parse_tags(value: &Value) -> Result<Vec<Tag>, ValidationError> {
    let outer = value.as_array().ok_or(ValidationError::InvalidTags)?;
    outer
        .iter()
        .map(|tag| {
            let items = tag.as_array().ok_or(ValidationError::InvalidTags)?;
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or(ValidationError::InvalidTags)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Tag)
        })
        .collect()
}

/// Fixed-length lowercase hex. Uppercase would hash differently on other clients.
fn hex_field<const N: usize>(
    obj: &Map<String, Value>,
    name: &'static str,
) -> Result<[u8; N], ValidationError> {
    let invalid = ValidationError::InvalidHex {
        field: name,
        expected: N * 2,
    };
    let s = field(obj, name)?.as_str().ok_or_else(|| invalid.clone())?;
    if s.len() != N * 2 || !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(invalid);
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out).map_err(|_| invalid)?;
    Ok(out)
}
