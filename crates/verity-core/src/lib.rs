//! # Verity Core
//!
//! Pure primitives for Verity: content fingerprints, author signatures,
//! posts and their edit ledger.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`ContentFingerprint`] - BLAKE3 digest of content bytes
//! - [`Identity`] - Ed25519 public key of an author or owner
//! - [`Post`] / [`EditEntry`] - current state plus append-only history
//! - [`PostEvent`] - notification emitted per committed mutation
//!
//! ## Signing
//!
//! Authors sign [`authorship_message`] of a fingerprint, never raw content.
//! See the [`signature`] module for the envelope format.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod post;
pub mod signature;
pub mod types;

pub use canonical::{authorship_message, SIGN_DOMAIN};
pub use crypto::{Identity, Keypair, SigningAuthority};
pub use error::CoreError;
pub use event::{EventRecord, PostEvent};
pub use fingerprint::{fingerprint, fingerprint_reader, ContentFingerprint};
pub use post::{EditEntry, Post};
pub use signature::{recover_identity, sign_fingerprint, verify_authorship, SIGNATURE_LEN};
pub use types::{PostId, StorageLocator, Timestamp};
