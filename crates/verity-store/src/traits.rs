//! Store trait: the abstract interface for registry state.
//!
//! The registry decides *whether* a mutation may happen; the store applies
//! an approved [`Transaction`] atomically and sequences its event.

use async_trait::async_trait;
use bytes::Bytes;
use verity_core::{
    ContentFingerprint, EditEntry, EventRecord, Identity, Post, PostEvent, PostId,
    StorageLocator, Timestamp,
};

use crate::error::{Result, StoreError};

/// An approved mutation, applied all-or-nothing by [`Store::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Publish a new post. `post.id` must be the next id and `post.history`
    /// must be empty.
    Create { post: Post },

    /// Append `entry` to the ledger of `id`, then overwrite its current state.
    ///
    /// `expected_owner` and `entry.prior_fingerprint` must still match the
    /// committed post, otherwise the commit is rejected as a conflict.
    Edit {
        id: PostId,
        expected_owner: Identity,
        entry: EditEntry,
        locator: StorageLocator,
        fingerprint: ContentFingerprint,
        signature: Bytes,
    },

    /// Hand the post from `from` to `to`.
    Transfer {
        id: PostId,
        from: Identity,
        to: Identity,
    },
}

impl Transaction {
    /// The post this transaction touches.
    pub fn post_id(&self) -> PostId {
        match self {
            Transaction::Create { post } => post.id,
            Transaction::Edit { id, .. } | Transaction::Transfer { id, .. } => *id,
        }
    }

    /// The notification this transaction emits when committed.
    pub fn event(&self) -> PostEvent {
        match self {
            Transaction::Create { post } => PostEvent::PostCreated {
                id: post.id,
                owner: post.owner,
                locator: post.current_locator.clone(),
            },
            Transaction::Edit {
                id,
                entry,
                fingerprint,
                ..
            } => PostEvent::PostEdited {
                id: *id,
                new_fingerprint: *fingerprint,
                recorded_at: entry.recorded_at,
            },
            Transaction::Transfer { id, from, to } => PostEvent::OwnershipTransferred {
                id: *id,
                from: *from,
                to: *to,
            },
        }
    }

    /// Check the transaction against the committed post it targets.
    ///
    /// Shared by every backend so they reject the same things.
    pub(crate) fn check_against(&self, current: Option<&Post>, last_id: Option<PostId>) -> Result<()> {
        match self {
            Transaction::Create { post } => {
                let expected = last_id.map(|id| id.next()).unwrap_or(PostId::FIRST);
                if post.id != expected {
                    return Err(StoreError::Conflict(format!(
                        "create expected id {}, got {}",
                        expected, post.id
                    )));
                }
                if !post.history.is_empty() {
                    return Err(StoreError::InvalidData(
                        "new post must have an empty history".into(),
                    ));
                }
                Ok(())
            }
            Transaction::Edit {
                id,
                expected_owner,
                entry,
                ..
            } => {
                let post = current.ok_or(StoreError::NotFound(*id))?;
                if &post.owner != expected_owner {
                    return Err(StoreError::Conflict(format!(
                        "owner of {} changed before edit committed",
                        id
                    )));
                }
                if post.current_fingerprint != entry.prior_fingerprint {
                    return Err(StoreError::Conflict(format!(
                        "content of {} changed before edit committed",
                        id
                    )));
                }
                Ok(())
            }
            Transaction::Transfer { id, from, .. } => {
                let post = current.ok_or(StoreError::NotFound(*id))?;
                if &post.owner != from {
                    return Err(StoreError::Conflict(format!(
                        "owner of {} changed before transfer committed",
                        id
                    )));
                }
                Ok(())
            }
        }
    }
}

/// The Store trait: async interface for registry state.
///
/// # Design Notes
///
/// - **Atomic commits**: a [`Transaction`] and its event either both land or
///   neither does.
/// - **Append-only**: edit entries and events are never updated or removed.
/// - **Sequenced events**: `seq` is gap-free and follows commit order.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a transaction and append its event, stamped with `at`.
    async fn commit(&self, tx: Transaction, at: Timestamp) -> Result<EventRecord>;

    // ─────────────────────────────────────────────────────────────────────────
    // Post Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a post with its full history.
    async fn get_post(&self, id: PostId) -> Result<Option<Post>>;

    /// Get only the edit ledger of a post, oldest first.
    async fn get_history(&self, id: PostId) -> Result<Option<Vec<EditEntry>>>;

    /// The highest id handed out so far.
    async fn last_post_id(&self) -> Result<Option<PostId>>;

    /// Ids of posts currently owned by `owner`, ascending.
    async fn posts_by_owner(&self, owner: &Identity) -> Result<Vec<PostId>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Event Log
    // ─────────────────────────────────────────────────────────────────────────

    /// Events with `seq > after_seq`, ascending.
    async fn events_since(&self, after_seq: u64) -> Result<Vec<EventRecord>>;

    /// Commit time of the newest event, if any.
    async fn last_event_at(&self) -> Result<Option<Timestamp>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Get a post or fail with [`StoreError::NotFound`].
    fn require_post(&self, id: PostId) -> impl std::future::Future<Output = Result<Post>> + Send;

    /// Number of posts ever created.
    fn post_count(&self) -> impl std::future::Future<Output = Result<u64>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn require_post(&self, id: PostId) -> Result<Post> {
        self.get_post(id).await?.ok_or(StoreError::NotFound(id))
    }

    async fn post_count(&self) -> Result<u64> {
        // Ids are sequential from 1 and posts are never deleted.
        Ok(self.last_post_id().await?.map(|id| id.get()).unwrap_or(0))
    }
}
