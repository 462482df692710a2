//! Common error types shared across crates.

use thiserror::Error;

/// Error type for every cipher operation.
///
/// Variants map to the failure classes callers are expected to distinguish:
/// - [`CryptoError::Authentication`] → ciphertext rejected (tampered, truncated, wrong key)
/// - [`CryptoError::Encoding`] → text cannot be represented in the required form
/// - [`CryptoError::InvalidKey`] / [`CryptoError::CipherNotRegistered`] → key provisioning
///
/// There is deliberately no configuration variant: an unreadable or unknown
/// handler setting resolves to the standard scheme instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The ciphertext failed its integrity check or is not a well-formed token.
    #[error("ciphertext failed authentication")]
    Authentication,

    /// Input or output could not be represented as the expected bytes or text.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Key material has the wrong length or encoding.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// No cipher is registered under the requested name.
    #[error("no cipher registered under {0:?}")]
    CipherNotRegistered(String),
}

impl CryptoError {
    /// Short machine-readable code, safe to put in logs and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            CryptoError::Authentication => "authentication",
            CryptoError::Encoding(_) => "encoding",
            CryptoError::InvalidKey(_) => "invalid_key",
            CryptoError::CipherNotRegistered(_) => "cipher_not_registered",
        }
    }
}
