//! [`CipherBackend`]: the cipher a facade encrypts with.

use std::sync::Arc;

use common::{CipherScheme, CryptoError};

use crate::crypto::FernetCipher;
use crate::registry::SymmetricCipher;

/// One of the two interchangeable header schemes.
///
/// The variant is fixed when the facade is built; nothing is resolved per call.
#[derive(Clone)]
pub enum CipherBackend {
    /// Fernet tokens under the owned key.
    Standard(FernetCipher),
    /// Cipher taken from the national registry.
    National(Arc<dyn SymmetricCipher>),
}

impl CipherBackend {
    pub fn scheme(&self) -> CipherScheme {
        match self {
            CipherBackend::Standard(_) => CipherScheme::Standard,
            CipherBackend::National(_) => CipherScheme::National,
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        match self {
            CipherBackend::Standard(fernet) => fernet.encrypt(plaintext),
            CipherBackend::National(cipher) => cipher.encrypt(plaintext),
        }
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        match self {
            CipherBackend::Standard(fernet) => fernet.decrypt(ciphertext),
            CipherBackend::National(cipher) => cipher.decrypt(ciphertext),
        }
    }
}

impl std::fmt::Debug for CipherBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CipherBackend::{:?}", self.scheme())
    }
}
