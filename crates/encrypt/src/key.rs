//! [`SecretKey`]: owned key material handed to a cipher at construction.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine as _,
};
use common::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque key bytes.
///
/// The bytes are never printed, not even by `Debug`, and are overwritten with
/// zeroes when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a url-safe, padded base64 key (the form Fernet keys are distributed in).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if `encoded` is not valid url-safe base64.
    pub fn from_url_safe_base64(encoded: &str) -> Result<Self, CryptoError> {
        URL_SAFE
            .decode(encoded.trim())
            .map(Self)
            .map_err(|_| CryptoError::InvalidKey("key is not url-safe base64".into()))
    }

    /// Decode a standard, padded base64 key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if `encoded` is not valid base64.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        STANDARD
            .decode(encoded.trim())
            .map(Self)
            .map_err(|_| CryptoError::InvalidKey("key is not base64".into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiped_on_drop() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<SecretKey>();

        let mut key = SecretKey::from_bytes(vec![0xAB; 16]);
        key.zeroize();
        assert!(key.is_empty());
    }

    #[test]
    fn redacted_in_debug() {
        let key = SecretKey::from_bytes(vec![0xAB; 16]);
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("171"));
    }

    #[test]
    fn url_safe_decoding() {
        // 32 bytes of 0xFB encode to '-' and '_' heavy url-safe text.
        let encoded = URL_SAFE.encode([0xFBu8; 32]);
        assert!(encoded.contains('-') || encoded.contains('_'));
        let key = SecretKey::from_url_safe_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &[0xFBu8; 32]);
    }

    #[test]
    fn standard_decoding_rejects_url_safe_alphabet() {
        let encoded = URL_SAFE.encode([0xFBu8; 32]);
        assert!(SecretKey::from_base64(&encoded).is_err());
    }

    #[test]
    fn invalid_base64_is_invalid_key() {
        let err = SecretKey::from_url_safe_base64("not base64!").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey(_)));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let encoded = format!("  {}\n", STANDARD.encode([7u8; 16]));
        assert_eq!(SecretKey::from_base64(&encoded).unwrap().len(), 16);
    }
}
