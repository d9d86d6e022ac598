//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use rand::RngCore;
use verity_core::{
    fingerprint, sign_fingerprint, ContentFingerprint, Identity, Keypair, Post, PostId,
    StorageLocator, Timestamp,
};
use verity_store::{MemoryStore, Store, StoreError, Transaction};

/// An author holding a keypair, able to sign content for the registry.
pub struct TestAuthor {
    pub keypair: Keypair,
}

/// Content signed by a [`TestAuthor`], ready to submit.
#[derive(Debug, Clone)]
pub struct SignedContent {
    pub content: Vec<u8>,
    pub locator: String,
    pub fingerprint: ContentFingerprint,
    pub signature: Vec<u8>,
}

impl TestAuthor {
    /// Create an author with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    pub fn identity(&self) -> Identity {
        self.keypair.identity()
    }

    /// Fingerprint and sign `content`, with a locator derived from it.
    pub fn sign(&self, content: &[u8]) -> SignedContent {
        let fp = fingerprint(content);
        SignedContent {
            content: content.to_vec(),
            locator: locator_for(&fp),
            fingerprint: fp,
            signature: sign_fingerprint(&self.keypair, &fp),
        }
    }

    /// Build a post owned by this author without going through a registry.
    pub fn make_post(&self, id: PostId, content: &[u8], created_at: Timestamp) -> Post {
        let signed = self.sign(content);
        Post::new(
            id,
            self.identity(),
            StorageLocator::new(signed.locator).expect("derived locator is never empty"),
            signed.fingerprint,
            signed.signature,
            created_at,
        )
    }
}

impl Default for TestAuthor {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple deterministic authors for multi-party tests.
pub fn multi_author_fixtures(count: usize) -> Vec<TestAuthor> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[31] = 0xA5;
            TestAuthor::with_seed(seed)
        })
        .collect()
}

/// A locator shaped like a content identifier for the given fingerprint.
pub fn locator_for(fp: &ContentFingerprint) -> String {
    format!("bafk{}", fp.to_hex())
}

/// Random content bytes of the given length.
pub fn random_content(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// A memory store pre-populated with one post per author, ids from 1.
pub async fn seeded_store(authors: &[TestAuthor]) -> Result<MemoryStore, StoreError> {
    let store = MemoryStore::new();
    for (i, author) in authors.iter().enumerate() {
        let id = PostId::new(i as u64 + 1);
        let at = 1_000 + i as Timestamp;
        let post = author.make_post(id, format!("post {}", i + 1).as_bytes(), at);
        store.commit(Transaction::Create { post }, at).await?;
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use verity_core::{authorship_message, verify_authorship};
    use verity_store::StoreExt;

    #[test]
    fn test_signed_content_verifies() {
        let author = TestAuthor::new();
        let signed = author.sign(b"hello");

        let message = authorship_message(&signed.fingerprint);
        assert!(verify_authorship(&message, &signed.signature, &author.identity()).unwrap());
        assert!(signed.locator.ends_with(&signed.fingerprint.to_hex()));
    }

    #[test]
    fn test_multi_author() {
        let authors = multi_author_fixtures(3);

        let ids: Vec<_> = authors.iter().map(|a| a.identity()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[test]
    fn test_random_content_length() {
        assert_eq!(random_content(0).len(), 0);
        assert_eq!(random_content(4096).len(), 4096);
    }

    #[tokio::test]
    async fn test_seeded_store() {
        let authors = multi_author_fixtures(2);
        let store = seeded_store(&authors).await.unwrap();

        assert_eq!(store.post_count().await.unwrap(), 2);
        let second = store.require_post(PostId::new(2)).await.unwrap();
        assert_eq!(second.owner, authors[1].identity());
    }
}
