//! # Veil Testkit
//!
//! Testing utilities for Veil.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known test cases with expected outputs for cross-platform verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical id and the `v2` ciphertext format:
//!
//! ```rust
//! use veil_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, id) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, id);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use veil_testkit::generators::{event_from_params, EventParams};
//!
//! proptest! {
//!     #[test]
//!     fn event_id_is_deterministic(params: EventParams) {
//!         let e1 = event_from_params(&params);
//!         let e2 = event_from_params(&params);
//!         prop_assert_eq!(e1.id, e2.id);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use veil_testkit::fixtures::multi_party_fixtures;
//!
//! let parties = multi_party_fixtures(2);
//! let gift = parties[0].make_gift_wrap(&parties[1].public_key(), "hi");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{event_from_params, unsigned_from_params, EventParams};
pub use vectors::{
    all_vectors, cipher_vectors, generate_event_from_vector, verify_all_vectors, CipherVector,
    GoldenVector,
};
