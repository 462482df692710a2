//! SM4 encryption of string values, the built-in national cipher.
//!
//! SM4 is run under the GCM-SIV construction (RFC 8452 with SM4 as the block
//! cipher), which authenticates the ciphertext and stays safe if a nonce is
//! ever repeated.
//!
//! # Ciphertext format
//!
//! ```text
//! base64( nonce:12 | ciphertext+tag )
//! ```

use aes_gcm_siv::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    AesGcmSiv, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::CryptoError;
use sm4::Sm4;

use crate::key::SecretKey;
use crate::registry::SymmetricCipher;

type Sm4GcmSiv = AesGcmSiv<Sm4>;

/// Byte length of an SM4 key (16 bytes = 128 bits).
pub const KEY_LEN: usize = 16;

/// Byte length of a GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

const TAG_LEN: usize = 16;

pub struct Sm4Cipher {
    cipher: Sm4GcmSiv,
}

impl Sm4Cipher {
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if `key` is not [`KEY_LEN`] bytes.
    pub fn new(key: &SecretKey) -> Result<Self, CryptoError> {
        if key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "SM4 key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let cipher = Sm4GcmSiv::new_from_slice(key.as_bytes())
            .map_err(|_| CryptoError::InvalidKey("SM4 key rejected".into()))?;
        Ok(Self { cipher })
    }

    /// Generate a random SM4 key.
    pub fn generate_key() -> SecretKey {
        let mut key = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        SecretKey::from_bytes(key)
    }
}

impl SymmetricCipher for Sm4Cipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CryptoError::Encoding("SM4 encryption failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let data = STANDARD
            .decode(ciphertext)
            .map_err(|_| CryptoError::Authentication)?;
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Authentication);
        }
        let (nonce, sealed) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::Authentication)?;

        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::Encoding("decrypted value is not valid UTF-8".into()))
    }
}

impl std::fmt::Debug for Sm4Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Sm4Cipher([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> Sm4Cipher {
        Sm4Cipher::new(&Sm4Cipher::generate_key()).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let c = cipher();
        let encrypted = c.encrypt("123-45-6789").unwrap();
        assert_eq!(c.decrypt(&encrypted).unwrap(), "123-45-6789");
    }

    #[test]
    fn unicode_round_trip() {
        let c = cipher();
        let encrypted = c.encrypt("国密算法").unwrap();
        assert_eq!(c.decrypt(&encrypted).unwrap(), "国密算法");
    }

    #[test]
    fn nonce_is_fresh_per_call() {
        let c = cipher();
        assert_ne!(c.encrypt("x").unwrap(), c.encrypt("x").unwrap());
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let encrypted = cipher().encrypt("secret").unwrap();
        assert_eq!(cipher().decrypt(&encrypted), Err(CryptoError::Authentication));
    }

    #[test]
    fn invalid_key_length_rejected() {
        let short_key = SecretKey::from_bytes(vec![0u8; 8]);
        assert!(Sm4Cipher::new(&short_key).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let c = cipher();
        let mut raw = STANDARD.decode(c.encrypt("tamper me").unwrap()).unwrap();
        // Flip a byte in the ciphertext to simulate tampering.
        raw[NONCE_LEN] ^= 0xFF;
        assert_eq!(
            c.decrypt(&STANDARD.encode(raw)),
            Err(CryptoError::Authentication)
        );
    }

    #[test]
    fn truncated_ciphertext_fails_auth() {
        let c = cipher();
        let raw = STANDARD.decode(c.encrypt("abc").unwrap()).unwrap();
        assert_eq!(
            c.decrypt(&STANDARD.encode(&raw[..NONCE_LEN + 4])),
            Err(CryptoError::Authentication)
        );
        assert_eq!(c.decrypt("not base64"), Err(CryptoError::Authentication));
    }
}
