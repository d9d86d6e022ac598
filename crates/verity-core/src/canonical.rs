//! Fixed byte encodings for signed messages.
//!
//! Authors sign the fingerprint, never the raw content. The signed message
//! is a domain prefix followed by the 32 fingerprint bytes; both the signer
//! and the verifier must build it with [`authorship_message`].

use crate::fingerprint::{ContentFingerprint, FINGERPRINT_LEN};

/// Domain prefix for post authorship signatures.
pub const SIGN_DOMAIN: &[u8] = b"verity/post-sig/v1";

/// Total length of an authorship message.
pub const AUTHORSHIP_MESSAGE_LEN: usize = SIGN_DOMAIN.len() + FINGERPRINT_LEN;

/// Encode the message an author signs for a given fingerprint.
///
/// Format: `SIGN_DOMAIN || fingerprint`
pub fn authorship_message(fingerprint: &ContentFingerprint) -> Vec<u8> {
    let mut buf = Vec::with_capacity(AUTHORSHIP_MESSAGE_LEN);
    buf.extend_from_slice(SIGN_DOMAIN);
    buf.extend_from_slice(fingerprint.as_bytes());
    buf
}
