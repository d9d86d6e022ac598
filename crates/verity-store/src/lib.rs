//! # Verity Store
//!
//! Storage abstraction for the Verity registry. Provides a trait-based
//! interface for post state, the edit ledger and the event log, with SQLite
//! and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`Transaction`] - An approved mutation, committed atomically
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use verity_store::{SqliteStore, Store};
//! use verity_core::PostId;
//!
//! async fn example() {
//!     let store = SqliteStore::open("verity.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let post = store.get_post(PostId::FIRST).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **All-or-nothing commits**: state change and event land together
//! - **Append-only ledger**: edit entries and events are never rewritten
//! - **No deletion**: posts exist forever once created

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt, Transaction};

/// Wall-clock milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
