//! Golden test vectors for deterministic verification.
//!
//! Any implementation that hashes content with BLAKE3, frames the
//! authorship message the same way and signs with Ed25519 must reproduce
//! these bytes exactly.

use serde::{Deserialize, Serialize};
use verity_core::{authorship_message, fingerprint, sign_fingerprint, Keypair};

/// A golden test vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: String,
    /// Signer seed (hex, 32 bytes).
    pub seed: String,
    /// Content bytes (hex).
    pub content: String,
    /// Expected BLAKE3 fingerprint (hex).
    pub fingerprint: String,
    /// Expected signer identity (hex).
    pub identity: String,
    /// Expected `SIGN_DOMAIN || fingerprint` (hex).
    pub message: String,
    /// Expected signature envelope (hex, 96 bytes).
    pub envelope: String,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "hello".into(),
            seed: hex::encode([0x42; 32]),
            content: hex::encode(b"hello"),
            fingerprint: "ea8f163db38682925e4491c5e58d4bb3506ef8c14eb78a86e908c5624a67200f".into(),
            identity: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12".into(),
            message: "7665726974792f706f73742d7369672f7631\
                      ea8f163db38682925e4491c5e58d4bb3506ef8c14eb78a86e908c5624a67200f"
                .into(),
            envelope: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12\
                       24d326637395461ca41ac26c2ae0d3bc5468410653e45a73b1a3ee5e203955f4\
                       20a11584c76b22ddbb4ae0426bdc3b3282976d15d3ec21e6a42eee0f4b528f0c"
                .into(),
        },
        GoldenVector {
            name: "world".into(),
            seed: hex::encode([0x42; 32]),
            content: hex::encode(b"world"),
            fingerprint: "d7894ae9716d38d2dfad0ec55424ca321ee12453d51f1b3adeb77d0475ed988c".into(),
            identity: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12".into(),
            message: "7665726974792f706f73742d7369672f7631\
                      d7894ae9716d38d2dfad0ec55424ca321ee12453d51f1b3adeb77d0475ed988c"
                .into(),
            envelope: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12\
                       4da89c0c5f6a181a6ba4927ceb760bb72e6079f9a5592cc1acabb22f786d88f1\
                       38b88d1cc2c8ab9c1a0dddd51851f62421687e4be63f922c926c62fc3bf79300"
                .into(),
        },
        GoldenVector {
            name: "empty content, zero seed".into(),
            seed: hex::encode([0x00; 32]),
            content: String::new(),
            fingerprint: "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262".into(),
            identity: "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29".into(),
            message: "7665726974792f706f73742d7369672f7631\
                      af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
                .into(),
            envelope: "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29\
                       759d62cccb6929e844d42ff02816921cdc2d93a590cc7316cc874cf8d2332eee\
                       dfc433eabeba833bf8d6d0ba73419d76813c38e8311b04b46e903276314e6501"
                .into(),
        },
    ]
}

/// Recompute a vector's outputs from its inputs.
///
/// Returns the names of fields that do not match. Inputs that fail to
/// decode are reported as `"seed"` / `"content"`.
pub fn check_vector(vector: &GoldenVector) -> Vec<&'static str> {
    let seed: [u8; 32] = match hex::decode(&vector.seed).ok().and_then(|b| b.try_into().ok()) {
        Some(seed) => seed,
        None => return vec!["seed"],
    };
    let content = match hex::decode(&vector.content) {
        Ok(content) => content,
        Err(_) => return vec!["content"],
    };

    let keypair = Keypair::from_seed(&seed);
    let fp = fingerprint(&content);

    let mut mismatches = Vec::new();
    if fp.to_hex() != vector.fingerprint {
        mismatches.push("fingerprint");
    }
    if keypair.identity().to_hex() != vector.identity {
        mismatches.push("identity");
    }
    if hex::encode(authorship_message(&fp)) != vector.message {
        mismatches.push("message");
    }
    if hex::encode(sign_fingerprint(&keypair, &fp)) != vector.envelope {
        mismatches.push("envelope");
    }
    mismatches
}

/// Verify all golden vectors.
///
/// Call this to verify your implementation matches the reference.
pub fn verify_all_vectors() -> Vec<(String, bool)> {
    all_vectors()
        .iter()
        .map(|v| (v.name.clone(), check_vector(v).is_empty()))
        .collect()
}

/// All vectors as pretty JSON, for other implementations to consume.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for vector in all_vectors() {
            assert_eq!(
                check_vector(&vector),
                Vec::<&str>::new(),
                "vector '{}' diverged",
                vector.name
            );
        }
    }

    #[test]
    fn test_tampered_vector_is_reported() {
        let mut vector = all_vectors().remove(0);
        vector.content = hex::encode(b"hellO");
        assert_eq!(check_vector(&vector), vec!["fingerprint", "message", "envelope"]);

        vector.seed = "zz".into();
        assert_eq!(check_vector(&vector), vec!["seed"]);
    }

    #[test]
    fn test_json_export_round_trips() {
        let json = vectors_json().unwrap();
        let parsed: Vec<GoldenVector> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), all_vectors().len());
        assert_eq!(parsed[0].fingerprint, all_vectors()[0].fingerprint);
    }
}
