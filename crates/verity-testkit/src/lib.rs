//! # Verity Testkit
//!
//! Testing utilities for Verity.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known fingerprints, authorship messages and
//!   signature envelopes for cross-implementation verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Authors and pre-populated stores for integration tests
//!
//! ## Golden Vectors
//!
//! ```rust
//! use verity_testkit::vectors::{all_vectors, check_vector};
//!
//! for vector in all_vectors() {
//!     assert!(check_vector(&vector).is_empty(), "{}", vector.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use verity_testkit::generators::EditScript;
//!
//! proptest! {
//!     #[test]
//!     fn chain_has_one_entry_per_version(script: EditScript) {
//!         prop_assert_eq!(script.expected_chain().len(), script.edits.len() + 1);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use verity_testkit::fixtures::TestAuthor;
//!
//! let author = TestAuthor::new();
//! let signed = author.sign(b"initial content");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_author_fixtures, SignedContent, TestAuthor};
pub use generators::EditScript;
pub use vectors::{all_vectors, check_vector, verify_all_vectors, GoldenVector};
