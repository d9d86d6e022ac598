//! Read-only verification of content against registered posts.
//!
//! Nothing here mutates state or takes the sequencer.

use verity_core::{authorship_message, fingerprint, recover_identity, Post, PostId};
use verity_store::Store;

use crate::error::Result;
use crate::registry::Registry;

/// Whether `candidate` hashes to the post's current fingerprint.
pub fn content_matches(post: &Post, candidate: &[u8]) -> bool {
    fingerprint(candidate) == post.current_fingerprint
}

/// Whether the stored signature still proves authorship of the current
/// fingerprint by the identity embedded in it.
pub fn signature_holds(post: &Post) -> bool {
    let message = authorship_message(&post.current_fingerprint);
    recover_identity(&message, &post.current_signature).is_ok()
}

/// Position of `candidate` in the post's provenance chain, original first.
///
/// If the same content was held more than once, the earliest index wins.
pub fn historical_index(post: &Post, candidate: &[u8]) -> Option<usize> {
    let fp = fingerprint(candidate);
    post.provenance_chain().iter().position(|held| *held == fp)
}

impl<S: Store> Registry<S> {
    /// Check candidate bytes against the current content of a post.
    ///
    /// Fails only with `NotFound` or a store error.
    pub async fn verify_content(&self, id: PostId, candidate: &[u8]) -> Result<bool> {
        let post = self.get(id).await?;
        let matches = content_matches(&post, candidate);
        tracing::debug!(post = %id, matches, "verified content");
        Ok(matches)
    }

    /// Re-check the stored signature of a post.
    pub async fn verify_signature(&self, id: PostId) -> Result<bool> {
        let post = self.get(id).await?;
        Ok(signature_holds(&post))
    }

    /// Find which version of a post `candidate` was, if any.
    ///
    /// Index 0 is the original content, the last index is the current one.
    pub async fn verify_historical(&self, id: PostId, candidate: &[u8]) -> Result<Option<usize>> {
        let post = self.get(id).await?;
        Ok(historical_index(&post, candidate))
    }
}
