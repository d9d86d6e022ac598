//! # Verity
//!
//! A registry of posts whose authorship and edit history can be verified by
//! anyone holding the content.
//!
//! ## Overview
//!
//! - **Posts**: a storage locator plus the fingerprint of its content, owned by
//!   one identity
//! - **Signatures**: every create and edit carries the owner's signature over
//!   the fingerprint
//! - **Edit ledger**: each edit appends the fingerprint it replaced
//! - **Verification**: re-hash candidate bytes and compare, read-only
//!
//! ## Usage
//!
//! ```rust,no_run
//! use verity::{Registry, RegistryConfig};
//! use verity::core::{fingerprint, sign_fingerprint, Keypair};
//! use verity::store::SqliteStore;
//!
//! async fn example() {
//!     let author = Keypair::generate();
//!     let store = SqliteStore::open("verity.db").unwrap();
//!     let registry = Registry::new(store, RegistryConfig::default());
//!
//!     let content = b"hello";
//!     let fp = fingerprint(content);
//!     let signature = sign_fingerprint(&author, &fp);
//!
//!     let id = registry
//!         .create("bafy-hello", fp, &signature, &author.identity())
//!         .await
//!         .unwrap();
//!
//!     assert!(registry.verify_content(id, content).await.unwrap());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `verity::core` - Core primitives (fingerprints, signatures, posts)
//! - `verity::store` - Storage abstraction and SQLite

pub mod clock;
pub mod config;
pub mod error;
pub mod registry;
pub mod verify;

// Re-export component crates
pub use verity_core as core;
pub use verity_store as store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use registry::Registry;

pub use verity_core::{
    ContentFingerprint, EditEntry, EventRecord, Identity, Keypair, Post, PostEvent, PostId,
    SigningAuthority,
};
