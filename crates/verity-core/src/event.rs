//! Notification records emitted on every committed mutation.
//!
//! Events are append-only and carry a store-assigned sequence number that
//! follows commit order. External indexers consume them in `seq` order.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::fingerprint::ContentFingerprint;
use crate::types::{PostId, StorageLocator, Timestamp};

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostEvent {
    /// A post was published.
    PostCreated {
        id: PostId,
        owner: Identity,
        locator: StorageLocator,
    },

    /// A post's content was replaced by its owner.
    PostEdited {
        id: PostId,
        new_fingerprint: ContentFingerprint,
        recorded_at: Timestamp,
    },

    /// A post changed hands.
    OwnershipTransferred {
        id: PostId,
        from: Identity,
        to: Identity,
    },
}

impl PostEvent {
    /// The post the event refers to.
    pub fn post_id(&self) -> PostId {
        match self {
            PostEvent::PostCreated { id, .. }
            | PostEvent::PostEdited { id, .. }
            | PostEvent::OwnershipTransferred { id, .. } => *id,
        }
    }

    /// Short name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            PostEvent::PostCreated { .. } => "post_created",
            PostEvent::PostEdited { .. } => "post_edited",
            PostEvent::OwnershipTransferred { .. } => "ownership_transferred",
        }
    }
}

/// A sequenced, durable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the event log (1-indexed, gap-free).
    pub seq: u64,

    /// When the mutation committed.
    pub committed_at: Timestamp,

    /// The event itself.
    pub event: PostEvent,
}
