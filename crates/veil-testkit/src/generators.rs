//! Proptest generators for property-based testing.

use proptest::prelude::*;

use veil_core::{Event, EventId, EventKind, Keypair, PublicKey, Tag, Timestamp, UnsignedEvent};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_filter_map("secret out of range", |bytes| {
        Keypair::from_secret_bytes(&bytes).ok()
    })
}

/// Generate a random EventId.
pub fn event_id() -> impl Strategy<Value = EventId> {
    any::<[u8; 32]>().prop_map(EventId::from_bytes)
}

/// Generate a valid PublicKey.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a timestamp anywhere in the unsigned range.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    prop_oneof![0u64..=2_000_000_000u64, any::<u64>()]
}

/// Generate an EventKind.
pub fn event_kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Metadata),
        Just(EventKind::TextNote),
        Just(EventKind::Seal),
        Just(EventKind::DirectMessage),
        Just(EventKind::GiftWrap),
        Just(EventKind::LocationMessage),
        any::<u32>().prop_map(EventKind::from_u32),
    ]
}

/// Generate content, including control characters and astral-plane text.
pub fn content(max_len: usize) -> impl Strategy<Value = String> {
    prop_oneof![
        prop::collection::vec(any::<char>(), 0..=max_len)
            .prop_map(|chars| chars.into_iter().collect()),
        "[ -~]{0,64}".prop_map(String::from),
    ]
}

/// Generate a tag with 1 to 4 items.
pub fn tag() -> impl Strategy<Value = Tag> {
    prop::collection::vec(content(16), 1..=4).prop_map(Tag)
}

/// Generate up to `max` tags.
pub fn tags(max: usize) -> impl Strategy<Value = Vec<Tag>> {
    prop::collection::vec(tag(), 0..=max)
}

/// Parameters for generating an event.
#[derive(Debug, Clone)]
pub struct EventParams {
    pub keypair: Keypair,
    pub created_at: Timestamp,
    pub kind: EventKind,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl Arbitrary for EventParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (keypair(), timestamp(), event_kind(), tags(4), content(200))
            .prop_map(|(keypair, created_at, kind, tags, content)| EventParams {
                keypair,
                created_at,
                kind,
                tags,
                content,
            })
            .boxed()
    }
}

/// Build the unsigned event from parameters.
pub fn unsigned_from_params(params: &EventParams) -> UnsignedEvent {
    UnsignedEvent::new(
        params.keypair.public_key(),
        params.created_at,
        params.kind,
        params.tags.clone(),
        params.content.clone(),
    )
}

/// Sign an event from parameters with zero aux randomness, so the result is
/// reproducible.
pub fn event_from_params(params: &EventParams) -> Event {
    unsigned_from_params(params).sign_with_aux(&params.keypair, &[0u8; 32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::{canonical_event, validate_event};

    proptest! {
        #[test]
        fn test_event_id_deterministic(params: EventParams) {
            let e1 = event_from_params(&params);
            let e2 = event_from_params(&params);

            prop_assert_eq!(e1.id, e2.id);
            prop_assert_eq!(e1.sig, e2.sig);
        }

        #[test]
        fn test_preimage_is_a_json_array(params: EventParams) {
            let event = unsigned_from_params(&params);
            let text = canonical_event(&event);
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();

            let array = value.as_array().unwrap();
            prop_assert_eq!(array.len(), 6);
            prop_assert_eq!(array[0].as_u64(), Some(0));
            prop_assert_eq!(array[5].as_str(), Some(params.content.as_str()));
        }

        #[test]
        fn test_signed_events_validate(params: EventParams) {
            let event = event_from_params(&params);
            prop_assert!(validate_event(&event).is_ok());
        }

        #[test]
        fn test_event_id_changes_with_content(
            kp in keypair(),
            c1 in content(100),
            c2 in content(100),
        ) {
            prop_assume!(c1 != c2);

            let e1 = UnsignedEvent::new(kp.public_key(), 1000, EventKind::TextNote, vec![], c1);
            let e2 = UnsignedEvent::new(kp.public_key(), 1000, EventKind::TextNote, vec![], c2);

            prop_assert_ne!(e1.id(), e2.id());
        }
    }
}
