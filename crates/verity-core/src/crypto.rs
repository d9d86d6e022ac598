//! Cryptographic identities and the signing authority boundary.
//!
//! Wraps Ed25519 with strong types. The core only ever verifies; signing
//! lives behind [`SigningAuthority`], implemented here by [`Keypair`] for
//! tools and tests.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A 32-byte Ed25519 public key identifying an author or owner.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(pub [u8; 32]);

impl Identity {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::Decoding(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::Decoding(format!("identity must be 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// Parse into a dalek verifying key.
    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, CoreError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|_| CoreError::MalformedSignature("signer key is not a valid Ed25519 point".into()))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Identity {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Something that holds a private key and signs on request.
///
/// This is the off-core signer: wallets, HSMs, or a local [`Keypair`].
/// Signatures are returned as the envelope bytes understood by
/// [`crate::signature::recover_identity`].
pub trait SigningAuthority {
    /// The public identity of the held key.
    fn identity(&self) -> Identity;

    /// Sign a message, returning envelope bytes.
    fn sign(&self, message: &[u8]) -> Vec<u8>;
}

/// A local Ed25519 keypair.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public identity.
    pub fn identity(&self) -> Identity {
        Identity(self.signing_key.verifying_key().to_bytes())
    }

    /// Produce a bare 64-byte Ed25519 signature.
    pub fn sign_raw(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl SigningAuthority for Keypair {
    fn identity(&self) -> Identity {
        Keypair::identity(self)
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        crate::signature::encode_envelope(&Keypair::identity(self), &self.sign_raw(message))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.identity())
    }
}
