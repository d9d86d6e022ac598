//! Posts and their edit ledger.
//!
//! A post is never destroyed. Its `history` only grows: each edit appends
//! the fingerprint it overwrote, so the full chain of content states can be
//! rebuilt from `history` plus the current fingerprint.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::fingerprint::ContentFingerprint;
use crate::types::{PostId, StorageLocator, Timestamp};

/// One entry in a post's edit ledger. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditEntry {
    /// The fingerprint that was current immediately before the edit.
    pub prior_fingerprint: ContentFingerprint,

    /// When the edit committed (registry clock, Unix ms).
    pub recorded_at: Timestamp,
}

/// A published post and its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Sequential identifier.
    pub id: PostId,

    /// The identity allowed to edit or transfer the post.
    pub owner: Identity,

    /// Where the current content lives.
    pub current_locator: StorageLocator,

    /// Fingerprint of the current content.
    pub current_fingerprint: ContentFingerprint,

    /// Signature envelope over the authorship message of `current_fingerprint`.
    /// Verified when written, not re-verified afterwards.
    pub current_signature: Bytes,

    /// When the post was created (registry clock, Unix ms).
    pub created_at: Timestamp,

    /// Prior content states, oldest first.
    pub history: Vec<EditEntry>,
}

impl Post {
    /// Create a freshly published post with an empty history.
    pub fn new(
        id: PostId,
        owner: Identity,
        locator: StorageLocator,
        fingerprint: ContentFingerprint,
        signature: impl Into<Bytes>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            current_locator: locator,
            current_fingerprint: fingerprint,
            current_signature: signature.into(),
            created_at,
            history: Vec::new(),
        }
    }

    /// Apply an edit: record the outgoing fingerprint, then overwrite.
    ///
    /// The append happens strictly before the overwrite so the ledger entry
    /// always holds the previous committed state.
    pub fn apply_edit(
        &mut self,
        locator: StorageLocator,
        fingerprint: ContentFingerprint,
        signature: impl Into<Bytes>,
        recorded_at: Timestamp,
    ) -> EditEntry {
        let entry = EditEntry {
            prior_fingerprint: self.current_fingerprint,
            recorded_at,
        };
        self.history.push(entry);

        self.current_locator = locator;
        self.current_fingerprint = fingerprint;
        self.current_signature = signature.into();
        entry
    }

    /// Number of edits applied since creation.
    pub fn edit_count(&self) -> usize {
        self.history.len()
    }

    /// Whether the post has ever been edited.
    pub fn is_edited(&self) -> bool {
        !self.history.is_empty()
    }

    /// The very first fingerprint this post held.
    pub fn original_fingerprint(&self) -> ContentFingerprint {
        self.history
            .first()
            .map(|e| e.prior_fingerprint)
            .unwrap_or(self.current_fingerprint)
    }

    /// The fingerprint that was current at ledger position `index`.
    ///
    /// `index == history.len()` is the current fingerprint.
    pub fn fingerprint_at(&self, index: usize) -> Option<ContentFingerprint> {
        match index.cmp(&self.history.len()) {
            std::cmp::Ordering::Less => Some(self.history[index].prior_fingerprint),
            std::cmp::Ordering::Equal => Some(self.current_fingerprint),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Every fingerprint the post has held, original first, current last.
    pub fn provenance_chain(&self) -> Vec<ContentFingerprint> {
        self.history
            .iter()
            .map(|e| e.prior_fingerprint)
            .chain(std::iter::once(self.current_fingerprint))
            .collect()
    }

    /// Timestamp of the most recent change to the content.
    pub fn last_modified(&self) -> Timestamp {
        self.history
            .last()
            .map(|e| e.recorded_at)
            .unwrap_or(self.created_at)
    }
}
