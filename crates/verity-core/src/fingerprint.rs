//! Content fingerprinting.
//!
//! A fingerprint is the BLAKE3-256 digest of the exact content bytes. The
//! same function backs post creation on the client side and the
//! verification service, so recomputation compares bit-for-bit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read};

use crate::error::CoreError;

/// Length of a fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 32;

/// A 32-byte content fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentFingerprint(pub [u8; FINGERPRINT_LEN]);

impl ContentFingerprint {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::Decoding(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for ContentFingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; FINGERPRINT_LEN]> for ContentFingerprint {
    fn from(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ContentFingerprint {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; FINGERPRINT_LEN] = slice.try_into().map_err(|_| {
            CoreError::Decoding(format!(
                "fingerprint must be {} bytes, got {}",
                FINGERPRINT_LEN,
                slice.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

/// Fingerprint a byte sequence. Total: every input, including empty, hashes.
pub fn fingerprint(bytes: &[u8]) -> ContentFingerprint {
    ContentFingerprint(*blake3::hash(bytes).as_bytes())
}

/// Fingerprint content from a reader without buffering it whole.
///
/// Produces the same value as [`fingerprint`] over the same bytes.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<ContentFingerprint> {
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 16 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentFingerprint(*hasher.finalize().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint(b"hello"), fingerprint(b"hello"));
        assert_ne!(fingerprint(b"hello"), fingerprint(b"world"));
    }

    #[test]
    fn test_empty_input() {
        // Known BLAKE3 digest of the empty string.
        assert_eq!(
            fingerprint(b"").to_hex(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_hex_roundtrip() {
        let fp = fingerprint(b"round");
        assert_eq!(ContentFingerprint::from_hex(&fp.to_hex()).unwrap(), fp);
        assert!(ContentFingerprint::from_hex("abcd").is_err());
        assert!(ContentFingerprint::from_hex("zz").is_err());
    }

    #[test]
    fn test_display_is_short_hex() {
        let fp = ContentFingerprint::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", fp), "abababababababab");
        assert!(format!("{:?}", fp).starts_with("Fingerprint("));
    }

    proptest! {
        #[test]
        fn reader_matches_slice(data in prop::collection::vec(any::<u8>(), 0..70_000)) {
            let streamed = fingerprint_reader(data.as_slice()).unwrap();
            prop_assert_eq!(streamed, fingerprint(&data));
        }

        #[test]
        fn distinct_content_distinct_fingerprints(
            a in prop::collection::vec(any::<u8>(), 0..256),
            b in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(fingerprint(&a), fingerprint(&b));
        }
    }
}
