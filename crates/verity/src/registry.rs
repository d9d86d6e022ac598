//! The Registry: signature-gated publishing and editing of posts.
//!
//! Every mutation runs through one sequencer, authorizes and authenticates
//! the caller, then lands as a single [`Transaction`] on the store.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use verity_core::{
    authorship_message, verify_authorship, ContentFingerprint, EditEntry, EventRecord, Identity,
    Post, PostId, StorageLocator, Timestamp,
};
use verity_store::{Store, StoreExt, Transaction};

use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// The post registry.
///
/// Owns all post state through its store. Only [`create`](Self::create),
/// [`edit`](Self::edit) and [`transfer`](Self::transfer) mutate it.
pub struct Registry<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: RegistryConfig,
    /// Source of `created_at` / `recorded_at`.
    clock: Arc<dyn Clock>,
    /// Single-writer gate: one mutation at a time, in arrival order.
    sequencer: Mutex<Sequencer>,
}

#[derive(Default)]
struct Sequencer {
    /// Timestamp of the last committed mutation, loaded lazily.
    last_stamp: Option<Timestamp>,
    seeded: bool,
}

impl<S: Store> Registry<S> {
    /// Create a registry over `store` using the wall clock.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create a registry with an injected clock.
    pub fn with_clock(store: S, config: RegistryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(store),
            config,
            clock,
            sequencer: Mutex::new(Sequencer::default()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish a new post owned by `caller`.
    ///
    /// `signature` must be `caller`'s envelope over
    /// [`authorship_message`] of `fingerprint`. Returns the fresh id.
    pub async fn create(
        &self,
        locator: &str,
        fingerprint: ContentFingerprint,
        signature: &[u8],
        caller: &Identity,
    ) -> Result<PostId> {
        let locator = self.check_locator(locator)?;
        self.authenticate(&fingerprint, signature, caller)?;

        let mut sequencer = self.sequencer.lock().await;

        let id = self
            .store
            .last_post_id()
            .await?
            .map(|last| last.next())
            .unwrap_or(PostId::FIRST);
        let at = self.stamp(&mut sequencer).await?;

        let post = Post::new(
            id,
            *caller,
            locator,
            fingerprint,
            Bytes::copy_from_slice(signature),
            at,
        );
        let record = self.store.commit(Transaction::Create { post }, at).await?;
        sequencer.last_stamp = Some(at);

        tracing::info!(
            post = %id,
            owner = %caller,
            fingerprint = %fingerprint,
            seq = record.seq,
            "post created"
        );
        Ok(id)
    }

    /// Replace the content of a post, recording the outgoing fingerprint.
    ///
    /// Checks run in order: existence, ownership, locator, signature. A
    /// non-owner is rejected whatever the locator or signature says.
    pub async fn edit(
        &self,
        id: PostId,
        new_locator: &str,
        new_fingerprint: ContentFingerprint,
        new_signature: &[u8],
        caller: &Identity,
    ) -> Result<()> {
        let mut sequencer = self.sequencer.lock().await;

        let post = self.store.require_post(id).await?;
        self.authorize(&post, caller)?;
        let locator = self.check_locator(new_locator)?;
        self.authenticate(&new_fingerprint, new_signature, caller)?;

        let at = self.stamp(&mut sequencer).await?;
        let tx = Transaction::Edit {
            id,
            expected_owner: post.owner,
            entry: EditEntry {
                prior_fingerprint: post.current_fingerprint,
                recorded_at: at,
            },
            locator,
            fingerprint: new_fingerprint,
            signature: Bytes::copy_from_slice(new_signature),
        };
        let record = self.store.commit(tx, at).await?;
        sequencer.last_stamp = Some(at);

        tracing::info!(
            post = %id,
            prior = %post.current_fingerprint,
            fingerprint = %new_fingerprint,
            edits = post.history.len() + 1,
            seq = record.seq,
            "post edited"
        );
        Ok(())
    }

    /// Hand ownership of a post to `new_owner`.
    ///
    /// Content, signature and history are untouched.
    pub async fn transfer(&self, id: PostId, new_owner: &Identity, caller: &Identity) -> Result<()> {
        let mut sequencer = self.sequencer.lock().await;

        let post = self.store.require_post(id).await?;
        self.authorize(&post, caller)?;

        let at = self.stamp(&mut sequencer).await?;
        let tx = Transaction::Transfer {
            id,
            from: post.owner,
            to: *new_owner,
        };
        let record = self.store.commit(tx, at).await?;
        sequencer.last_stamp = Some(at);

        tracing::info!(post = %id, from = %post.owner, to = %new_owner, seq = record.seq, "ownership transferred");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a post with its full history.
    pub async fn get(&self, id: PostId) -> Result<Post> {
        Ok(self.store.require_post(id).await?)
    }

    /// The edit ledger of a post, oldest first.
    pub async fn history(&self, id: PostId) -> Result<Vec<EditEntry>> {
        self.store
            .get_history(id)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    /// Number of posts ever created.
    pub async fn post_count(&self) -> Result<u64> {
        Ok(self.store.post_count().await?)
    }

    /// Ids of posts currently owned by `owner`, ascending.
    pub async fn posts_by_owner(&self, owner: &Identity) -> Result<Vec<PostId>> {
        Ok(self.store.posts_by_owner(owner).await?)
    }

    /// Committed events with `seq > after_seq`, in commit order.
    pub async fn events_since(&self, after_seq: u64) -> Result<Vec<EventRecord>> {
        Ok(self.store.events_since(after_seq).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Gates
    // ─────────────────────────────────────────────────────────────────────────

    fn check_locator(&self, locator: &str) -> Result<StorageLocator> {
        Ok(StorageLocator::new(locator)?)
    }

    fn authorize(&self, post: &Post, caller: &Identity) -> Result<()> {
        if &post.owner != caller {
            tracing::warn!(post = %post.id, caller = %caller, owner = %post.owner, "rejected: caller is not the owner");
            return Err(RegistryError::Authorization {
                id: post.id,
                caller: *caller,
            });
        }
        Ok(())
    }

    fn authenticate(
        &self,
        fingerprint: &ContentFingerprint,
        signature: &[u8],
        caller: &Identity,
    ) -> Result<()> {
        let message = authorship_message(fingerprint);
        match verify_authorship(&message, signature, caller) {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::warn!(caller = %caller, fingerprint = %fingerprint, "rejected: signature does not match caller");
                Err(RegistryError::Authentication)
            }
            Err(e) => {
                tracing::warn!(caller = %caller, error = %e, "rejected: malformed signature");
                Err(e.into())
            }
        }
    }

    /// Next mutation timestamp, never earlier than the last committed one.
    async fn stamp(&self, sequencer: &mut Sequencer) -> Result<Timestamp> {
        if !sequencer.seeded {
            sequencer.last_stamp = self.store.last_event_at().await?;
            sequencer.seeded = true;
        }

        let now = self.clock.now_millis();
        Ok(match sequencer.last_stamp {
            Some(last) if self.config.strict_monotonic_time => now.max(last.saturating_add(1)),
            Some(last) => now.max(last),
            None => now,
        })
    }
}
