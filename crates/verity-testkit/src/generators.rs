//! Proptest generators for property-based testing.

use proptest::prelude::*;

use verity_core::{fingerprint, ContentFingerprint, Identity, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random identity that is a valid public key.
pub fn identity() -> impl Strategy<Value = Identity> {
    keypair().prop_map(|kp| kp.identity())
}

/// Generate arbitrary fingerprint bytes (not tied to any content).
pub fn content_fingerprint() -> impl Strategy<Value = ContentFingerprint> {
    any::<[u8; 32]>().prop_map(ContentFingerprint::from_bytes)
}

/// Generate content bytes of specified max length.
pub fn content(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a non-empty storage locator.
pub fn locator() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,64}"
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// An author plus the content of a post and its successive edits.
#[derive(Debug, Clone)]
pub struct EditScript {
    pub author: Keypair,
    pub original: Vec<u8>,
    pub edits: Vec<Vec<u8>>,
}

impl EditScript {
    /// Fingerprints in the order the post holds them, original first.
    pub fn expected_chain(&self) -> Vec<ContentFingerprint> {
        std::iter::once(&self.original)
            .chain(self.edits.iter())
            .map(|c| fingerprint(c))
            .collect()
    }
}

impl Arbitrary for EditScript {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            content(256),
            prop::collection::vec(content(256), 0..8),
        )
            .prop_map(|(seed, original, edits)| EditScript {
                author: Keypair::from_seed(&seed),
                original,
                edits,
            })
            .boxed()
    }
}
