//! Signature verification: recover a signer identity and compare it.
//!
//! Ed25519 has no public-key recovery, so a post signature is an
//! author-bearing envelope:
//!
//! ```text
//! signer public key (32 bytes) || Ed25519 signature (64 bytes)
//! ```
//!
//! Recovery parses the key and proves that it signed the message. A
//! structurally broken envelope is [`CoreError::MalformedSignature`]; an
//! envelope whose key did not sign this message is [`CoreError::Recovery`].

use ed25519_dalek::Signature;

use crate::canonical::authorship_message;
use crate::crypto::{Identity, SigningAuthority};
use crate::error::CoreError;
use crate::fingerprint::ContentFingerprint;

/// Length of the embedded signer key.
pub const SIGNER_KEY_LEN: usize = 32;

/// Length of the raw Ed25519 signature.
pub const RAW_SIGNATURE_LEN: usize = 64;

/// Length of a complete signature envelope.
pub const SIGNATURE_LEN: usize = SIGNER_KEY_LEN + RAW_SIGNATURE_LEN;

/// Build an envelope from a signer identity and a raw signature.
pub fn encode_envelope(signer: &Identity, raw: &[u8; RAW_SIGNATURE_LEN]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SIGNATURE_LEN);
    buf.extend_from_slice(signer.as_bytes());
    buf.extend_from_slice(raw);
    buf
}

/// Split an envelope into its signer identity and raw signature.
fn decode_envelope(signature: &[u8]) -> Result<(Identity, [u8; RAW_SIGNATURE_LEN]), CoreError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(CoreError::MalformedSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LEN,
            signature.len()
        )));
    }

    let (key, raw) = signature.split_at(SIGNER_KEY_LEN);
    let mut key_arr = [0u8; SIGNER_KEY_LEN];
    key_arr.copy_from_slice(key);
    let mut raw_arr = [0u8; RAW_SIGNATURE_LEN];
    raw_arr.copy_from_slice(raw);

    Ok((Identity(key_arr), raw_arr))
}

/// Recover the identity that produced `signature` over `message`.
pub fn recover_identity(message: &[u8], signature: &[u8]) -> Result<Identity, CoreError> {
    let (signer, raw) = decode_envelope(signature)?;
    let verifying_key = signer.verifying_key()?;

    verifying_key
        .verify_strict(message, &Signature::from_bytes(&raw))
        .map_err(|_| CoreError::Recovery)?;

    Ok(signer)
}

/// Check that `claimed` produced `signature` over `message`.
///
/// A mismatch is `Ok(false)`, never an error. Only structurally invalid
/// envelopes return `Err(MalformedSignature)`.
pub fn verify_authorship(
    message: &[u8],
    signature: &[u8],
    claimed: &Identity,
) -> Result<bool, CoreError> {
    match recover_identity(message, signature) {
        Ok(recovered) => Ok(&recovered == claimed),
        Err(CoreError::Recovery) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Sign the authorship message for a fingerprint.
pub fn sign_fingerprint<A: SigningAuthority + ?Sized>(
    authority: &A,
    fingerprint: &ContentFingerprint,
) -> Vec<u8> {
    authority.sign(&authorship_message(fingerprint))
}
