//! [`EncryptionFacade`]: the public encrypt/decrypt contract.
//!
//! # Invariants
//!
//! - `encrypt` is idempotent: text that already carries this facade's header is
//!   returned unchanged.
//! - `decrypt` strips only this facade's own header. Unprefixed values and
//!   values with a foreign header reach the backend untouched.
//! - Backend errors reach the caller unchanged; no partial plaintext is returned.

use std::sync::Arc;

use common::{CipherScheme, CryptoError};
use tracing::debug;

use crate::backend::CipherBackend;
use crate::crypto::{legacy_decrypt, FernetCipher};
use crate::header::{split_header, HeaderCodec};
use crate::key::SecretKey;
use crate::registry::{CipherRegistry, SymmetricCipher, DEFAULT_CIPHER};

/// Outcome of moving a single stored value onto the facade's scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Migration {
    /// The value already carries this facade's header.
    Current,
    /// The value carries another scheme's header and was left alone.
    Foreign(CipherScheme),
    /// A legacy value, re-encrypted under this facade's scheme.
    Migrated(String),
}

/// Header codec plus backend for one scheme.
///
/// Holds no mutable state; share it behind an `Arc` across threads.
#[derive(Debug, Clone)]
pub struct EncryptionFacade {
    header: HeaderCodec,
    backend: CipherBackend,
}

impl EncryptionFacade {
    pub fn new(backend: CipherBackend) -> Self {
        Self {
            header: HeaderCodec::new(backend.scheme()),
            backend,
        }
    }

    /// Standard-scheme facade over a decoded Fernet key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the key is not 32 bytes.
    pub fn standard(key: &SecretKey) -> Result<Self, CryptoError> {
        Ok(Self::new(CipherBackend::Standard(FernetCipher::new(key)?)))
    }

    /// National-scheme facade over an explicit cipher.
    pub fn national(cipher: Arc<dyn SymmetricCipher>) -> Self {
        Self::new(CipherBackend::National(cipher))
    }

    /// National-scheme facade over the registry's [`DEFAULT_CIPHER`] entry.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CipherNotRegistered`] if the entry is missing.
    pub fn national_from_registry(registry: &CipherRegistry) -> Result<Self, CryptoError> {
        Ok(Self::national(registry.cipher(DEFAULT_CIPHER)?))
    }

    pub fn scheme(&self) -> CipherScheme {
        self.header.scheme()
    }

    /// Encrypt `text` and tag it with this facade's header.
    ///
    /// Text that already starts with the header is returned as-is.
    pub fn encrypt(&self, text: &str) -> Result<String, CryptoError> {
        if self.header.contains_header(text) {
            debug!(scheme = %self.scheme(), "value already encrypted; skipping");
            return Ok(text.to_owned());
        }
        let payload = self.backend.encrypt(text)?;
        Ok(self.header.add_header(&payload))
    }

    /// Decrypt a value produced by [`EncryptionFacade::encrypt`].
    ///
    /// Unprefixed values are passed to the backend unchanged, which lets
    /// values written before headers were introduced still decrypt.
    pub fn decrypt(&self, encrypted: &str) -> Result<String, CryptoError> {
        let (matched, payload) = self.header.strip_header(encrypted);
        if matched.is_none() {
            debug!(scheme = %self.scheme(), "decrypting value without own header");
        }
        self.backend.decrypt(payload)
    }

    /// Move a stored value onto this facade's scheme.
    ///
    /// Unprefixed values are decrypted with the legacy codec under
    /// `legacy_key` and re-encrypted here. Values with this facade's header or
    /// a foreign header are reported and not touched.
    ///
    /// # Errors
    ///
    /// Propagates legacy decryption and backend encryption failures.
    pub fn migrate_legacy(&self, value: &str, legacy_key: &str) -> Result<Migration, CryptoError> {
        match split_header(value) {
            (Some(scheme), _) if scheme == self.scheme() => Ok(Migration::Current),
            (Some(scheme), _) => Ok(Migration::Foreign(scheme)),
            (None, _) => {
                // Always encrypt: the legacy plaintext may itself start with a header.
                let plaintext = legacy_decrypt(value, legacy_key)?;
                let payload = self.backend.encrypt(&plaintext)?;
                Ok(Migration::Migrated(self.header.add_header(&payload)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{legacy_encrypt, Sm4Cipher};
    use crate::registry::MockSymmetricCipher;
    use common::scheme::{NATIONAL_HEADER, STANDARD_HEADER};
    use proptest::prelude::*;

    const LEGACY_KEY: &str = "aaaaaaaaaaaaaaaaaaaaaaaa";

    fn standard() -> EncryptionFacade {
        let key = SecretKey::from_url_safe_base64(&FernetCipher::generate_key()).unwrap();
        EncryptionFacade::standard(&key).unwrap()
    }

    fn national() -> EncryptionFacade {
        EncryptionFacade::national(Arc::new(
            Sm4Cipher::new(&Sm4Cipher::generate_key()).unwrap(),
        ))
    }

    #[test]
    fn standard_round_trip() {
        let facade = standard();
        let encrypted = facade.encrypt("foo").unwrap();
        assert!(encrypted.starts_with("bkcrypt$"));
        assert_eq!(facade.decrypt(&encrypted).unwrap(), "foo");
    }

    #[test]
    fn standard_encrypt_twice_is_noop() {
        let facade = standard();
        let encrypted = facade.encrypt("foo").unwrap();
        assert_eq!(facade.encrypt(&encrypted).unwrap(), encrypted);
    }

    #[test]
    fn national_round_trip() {
        let facade = national();
        let encrypted = facade.encrypt("foo").unwrap();
        assert!(encrypted.starts_with("nationcrypto$"));
        assert_eq!(facade.decrypt(&encrypted).unwrap(), "foo");
    }

    #[test]
    fn national_encrypt_twice_is_noop() {
        let facade = national();
        let encrypted = facade.encrypt("foo").unwrap();
        assert_eq!(facade.encrypt(&encrypted).unwrap(), encrypted);
    }

    #[test]
    fn unprefixed_standard_token_still_decrypts() {
        let facade = standard();
        let encrypted = facade.encrypt("foo").unwrap();
        let bare = encrypted.strip_prefix(STANDARD_HEADER).unwrap();
        assert_eq!(facade.decrypt(bare).unwrap(), "foo");
    }

    #[test]
    fn tampered_payload_fails_authentication() {
        let facade = standard();
        let encrypted = facade.encrypt("foo").unwrap();
        let payload = encrypted.strip_prefix(STANDARD_HEADER).unwrap();

        for i in 0..payload.len() {
            let mut bytes = payload.as_bytes().to_vec();
            // Swap to a different character of the same url-safe alphabet.
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = format!("{STANDARD_HEADER}{}", String::from_utf8(bytes).unwrap());
            assert_eq!(
                facade.decrypt(&tampered),
                Err(CryptoError::Authentication),
                "position {i}"
            );
        }
    }

    #[test]
    fn foreign_header_reaches_backend_unchanged() {
        let mut mock = MockSymmetricCipher::new();
        mock.expect_decrypt()
            .times(1)
            .returning(|c| Ok(format!("saw:{c}")));
        let facade = EncryptionFacade::national(Arc::new(mock));

        assert_eq!(
            facade.decrypt("bkcrypt$XYZ").unwrap(),
            "saw:bkcrypt$XYZ"
        );
    }

    #[test]
    fn own_header_is_stripped_before_backend() {
        let mut mock = MockSymmetricCipher::new();
        mock.expect_decrypt()
            .times(1)
            .returning(|c| Ok(format!("saw:{c}")));
        let facade = EncryptionFacade::national(Arc::new(mock));

        assert_eq!(facade.decrypt("nationcrypto$XYZ").unwrap(), "saw:XYZ");
    }

    #[test]
    fn already_encrypted_text_never_reaches_backend() {
        let mut mock = MockSymmetricCipher::new();
        mock.expect_encrypt().never();
        let facade = EncryptionFacade::national(Arc::new(mock));

        let value = format!("{NATIONAL_HEADER}opaque");
        assert_eq!(facade.encrypt(&value).unwrap(), value);
    }

    #[test]
    fn backend_errors_propagate() {
        let mut mock = MockSymmetricCipher::new();
        mock.expect_encrypt()
            .returning(|_| Err(CryptoError::Encoding("boom".into())));
        mock.expect_decrypt()
            .returning(|_| Err(CryptoError::Authentication));
        let facade = EncryptionFacade::national(Arc::new(mock));

        assert_eq!(
            facade.encrypt("x"),
            Err(CryptoError::Encoding("boom".into()))
        );
        assert_eq!(
            facade.decrypt("nationcrypto$x"),
            Err(CryptoError::Authentication)
        );
    }

    #[test]
    fn national_from_empty_registry_fails() {
        let err = EncryptionFacade::national_from_registry(&CipherRegistry::new()).unwrap_err();
        assert_eq!(err, CryptoError::CipherNotRegistered("default".into()));
    }

    #[test]
    fn migrate_legacy_value() {
        let facade = standard();
        let legacy = legacy_encrypt("foo", LEGACY_KEY).unwrap();

        let Migration::Migrated(migrated) = facade.migrate_legacy(&legacy, LEGACY_KEY).unwrap()
        else {
            panic!("expected a migrated value");
        };
        assert!(migrated.starts_with(STANDARD_HEADER));
        assert_eq!(facade.decrypt(&migrated).unwrap(), "foo");
    }

    #[test]
    fn migrate_encrypts_legacy_plaintext_that_looks_like_a_header() {
        let facade = standard();
        let plaintext = format!("{STANDARD_HEADER}hunter2");
        let legacy = legacy_encrypt(&plaintext, LEGACY_KEY).unwrap();

        let Migration::Migrated(migrated) = facade.migrate_legacy(&legacy, LEGACY_KEY).unwrap()
        else {
            panic!("expected a migrated value");
        };
        assert_ne!(migrated, plaintext);
        assert!(!migrated.contains("hunter2"));
        assert_eq!(facade.decrypt(&migrated).unwrap(), plaintext);
    }

    #[test]
    fn migrate_leaves_current_and_foreign_values() {
        let facade = standard();
        let current = facade.encrypt("foo").unwrap();
        assert_eq!(
            facade.migrate_legacy(&current, LEGACY_KEY).unwrap(),
            Migration::Current
        );
        assert_eq!(
            facade.migrate_legacy("nationcrypto$abc", LEGACY_KEY).unwrap(),
            Migration::Foreign(CipherScheme::National)
        );
    }

    #[test]
    fn migrate_rejects_garbage() {
        assert!(matches!(
            standard().migrate_legacy("not legacy!", LEGACY_KEY),
            Err(CryptoError::Encoding(_))
        ));
    }

    #[test]
    fn facade_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EncryptionFacade>();

        let facade = Arc::new(standard());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let facade = Arc::clone(&facade);
                std::thread::spawn(move || {
                    let text = format!("value-{i}");
                    let encrypted = facade.encrypt(&text).unwrap();
                    assert_eq!(facade.decrypt(&encrypted).unwrap(), text);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    proptest! {
        #[test]
        fn standard_round_trips_any_text(text in any::<String>()) {
            prop_assume!(!text.starts_with(STANDARD_HEADER));
            let facade = standard();
            let encrypted = facade.encrypt(&text).unwrap();
            prop_assert_eq!(facade.decrypt(&encrypted).unwrap(), text);
            prop_assert_eq!(facade.encrypt(&encrypted).unwrap(), encrypted);
        }

        #[test]
        fn national_round_trips_any_text(text in any::<String>()) {
            prop_assume!(!text.starts_with(NATIONAL_HEADER));
            let facade = national();
            let encrypted = facade.encrypt(&text).unwrap();
            prop_assert_eq!(facade.decrypt(&encrypted).unwrap(), text);
            prop_assert_eq!(facade.encrypt(&encrypted).unwrap(), encrypted);
        }
    }
}
