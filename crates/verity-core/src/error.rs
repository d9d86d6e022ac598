//! Error types for Verity Core.

use thiserror::Error;

/// Errors raised by the pure primitives in this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The signature bytes are not a structurally valid envelope.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The envelope parsed, but no identity can be derived for the message.
    #[error("could not recover a signer identity from the signature")]
    Recovery,

    /// The storage locator is empty.
    #[error("invalid storage locator: {0}")]
    InvalidLocator(String),

    /// A hex or byte representation could not be decoded.
    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
