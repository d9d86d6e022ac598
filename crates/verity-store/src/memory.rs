//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite, no persistence. A commit runs inside one
//! write-lock critical section, so readers never see half of it.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use verity_core::{EditEntry, EventRecord, Identity, Post, PostId, Timestamp};

use crate::error::{Result, StoreError};
use crate::traits::{Store, Transaction};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Posts indexed by id.
    posts: BTreeMap<PostId, Post>,

    /// Event log, index `i` holds `seq = i + 1`.
    events: Vec<EventRecord>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn commit(&self, tx: Transaction, at: Timestamp) -> Result<EventRecord> {
        let mut inner = self.write()?;

        let id = tx.post_id();
        let last_id = inner.posts.keys().next_back().copied();
        tx.check_against(inner.posts.get(&id), last_id)?;

        let record = EventRecord {
            seq: inner.events.len() as u64 + 1,
            committed_at: at,
            event: tx.event(),
        };

        // Checks passed; nothing below can fail.
        match tx {
            Transaction::Create { post } => {
                inner.posts.insert(post.id, post);
            }
            Transaction::Edit {
                id,
                entry,
                locator,
                fingerprint,
                signature,
                ..
            } => {
                if let Some(post) = inner.posts.get_mut(&id) {
                    post.apply_edit(locator, fingerprint, signature, entry.recorded_at);
                }
            }
            Transaction::Transfer { id, to, .. } => {
                if let Some(post) = inner.posts.get_mut(&id) {
                    post.owner = to;
                }
            }
        }
        inner.events.push(record.clone());

        tracing::debug!(seq = record.seq, post = %id, event = record.event.name(), "memory store commit");
        Ok(record)
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        let inner = self.read()?;
        Ok(inner.posts.get(&id).cloned())
    }

    async fn get_history(&self, id: PostId) -> Result<Option<Vec<EditEntry>>> {
        let inner = self.read()?;
        Ok(inner.posts.get(&id).map(|p| p.history.clone()))
    }

    async fn last_post_id(&self) -> Result<Option<PostId>> {
        let inner = self.read()?;
        Ok(inner.posts.keys().next_back().copied())
    }

    async fn posts_by_owner(&self, owner: &Identity) -> Result<Vec<PostId>> {
        let inner = self.read()?;
        Ok(inner
            .posts
            .values()
            .filter(|p| &p.owner == owner)
            .map(|p| p.id)
            .collect())
    }

    async fn last_event_at(&self) -> Result<Option<Timestamp>> {
        Ok(self.read()?.events.last().map(|r| r.committed_at))
    }

    async fn events_since(&self, after_seq: u64) -> Result<Vec<EventRecord>> {
        let inner = self.read()?;
        let start = usize::try_from(after_seq)
            .unwrap_or(usize::MAX)
            .min(inner.events.len());
        Ok(inner.events[start..].to_vec())
    }
}
