//! Error types for the Registry.

use thiserror::Error;
use verity_core::{CoreError, Identity, PostId};
use verity_store::StoreError;

/// Errors that can occur during Registry operations.
///
/// A failed operation leaves registry state unchanged.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No post with this id has been created.
    #[error("post not found: {0}")]
    NotFound(PostId),

    /// Caller is not the current owner of the post.
    #[error("identity {caller} does not own post {id}")]
    Authorization { id: PostId, caller: Identity },

    /// Signature does not prove the caller signed the fingerprint.
    #[error("signature does not authenticate the caller")]
    Authentication,

    /// Signature bytes are structurally invalid.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// No identity could be recovered from the signature.
    ///
    /// Registry operations report a failed recovery as [`Authentication`];
    /// this variant only arises when converting a [`CoreError::Recovery`]
    /// from direct use of `recover_identity`.
    ///
    /// [`Authentication`]: RegistryError::Authentication
    #[error("signature recovery failed")]
    Recovery,

    /// Locator is empty.
    #[error("invalid storage locator: {0}")]
    InvalidLocator(String),

    /// Other core error (decoding).
    #[error("core error: {0}")]
    Core(CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedSignature(msg) => RegistryError::MalformedSignature(msg),
            CoreError::Recovery => RegistryError::Recovery,
            CoreError::InvalidLocator(msg) => RegistryError::InvalidLocator(msg),
            other => RegistryError::Core(other),
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RegistryError::NotFound(id),
            other => RegistryError::Store(other),
        }
    }
}

/// Result type for Registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
