//! Canonical JSON encoding for event identifiers.
//!
//! The id preimage is the compact JSON array
//! `[0,"<pubkey>",<created_at>,<kind>,<tags>,"<content>"]`:
//! - No whitespace anywhere
//! - Numbers as bare decimals
//! - Strings escape only `"`, `\` and control characters below U+0020
//! - `/` and non-ASCII characters are emitted literally
//!
//! Every client on the network must hash the same bytes, so this encoder is
//! written by hand rather than delegated to a general-purpose serializer.

use serde_json::Value;

use crate::crypto::PublicKey;
use crate::error::ValidationError;
use crate::event::{EventKind, Tag, UnsignedEvent};
use crate::types::Timestamp;
use crate::validation::unsigned_from_object;

/// Encode the id preimage for the given fields.
pub fn canonical_json(
    pubkey: &PublicKey,
    created_at: Timestamp,
    kind: EventKind,
    tags: &[Tag],
    content: &str,
) -> String {
    let mut out = String::with_capacity(96 + content.len());
    out.push_str("[0,\"");
    out.push_str(&pubkey.to_hex());
    out.push_str("\",");
    encode_uint(&mut out, created_at);
    out.push(',');
    encode_uint(&mut out, u64::from(kind.as_u32()));
    out.push(',');
    encode_tags(&mut out, tags);
    out.push(',');
    encode_str(&mut out, content);
    out.push(']');
    out
}

/// Encode the id preimage of an unsigned event.
pub fn canonical_event(event: &UnsignedEvent) -> String {
    canonical_json(
        &event.pubkey,
        event.created_at,
        event.kind,
        &event.tags,
        &event.content,
    )
}

/// The id preimage as UTF-8 bytes.
pub fn canonical_bytes(event: &UnsignedEvent) -> Vec<u8> {
    canonical_event(event).into_bytes()
}

/// Encode the id preimage of an untyped event object received from outside.
///
/// All fields are checked before anything is written, so a rejected value
/// never yields a partial serialization. Nothing is coerced: `1.0` is not an
/// integer and `"1"` is not a kind.
pub fn canonical_from_value(value: &Value) -> Result<String, ValidationError> {
    let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let unsigned = unsigned_from_object(obj)?;
    Ok(canonical_event(&unsigned))
}

fn encode_uint(out: &mut String, n: u64) {
    out.push_str(&n.to_string());
}

fn encode_tags(out: &mut String, tags: &[Tag]) {
    out.push('[');
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('[');
        for (j, item) in tag.as_slice().iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            encode_str(out, item);
        }
        out.push(']');
    }
    out.push(']');
}

/// Encode a JSON string literal, including the surrounding quotes.
pub fn encode_str(out: &mut String, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let b = c as u32 as usize;
                out.push_str("\\u00");
                out.push(HEX[b >> 4] as char);
                out.push(HEX[b & 0x0f] as char);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
