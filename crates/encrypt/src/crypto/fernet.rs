//! Fernet tokens: AES-128-CBC with an HMAC-SHA256 tag.
//!
//! Tokens are byte-compatible with `cryptography.fernet`, so values written by
//! either implementation decrypt with the other.
//!
//! ```text
//! base64url( 0x80 | timestamp:u64be | iv:16 | aes128cbc_pkcs7(plaintext) | hmac_sha256:32 )
//! ```
//!
//! The HMAC covers everything before it and is verified before any decryption.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use aes::Aes128;
use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use common::CryptoError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::key::SecretKey;

type HmacSha256 = Hmac<Sha256>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Byte length of a decoded Fernet key (signing half + encryption half).
pub const KEY_LEN: usize = 32;

const HALF_KEY_LEN: usize = KEY_LEN / 2;
const VERSION: u8 = 0x80;
const TIMESTAMP_LEN: usize = 8;
const IV_LEN: usize = 16;
const TAG_LEN: usize = 32;
const PREAMBLE_LEN: usize = 1 + TIMESTAMP_LEN + IV_LEN;
const MAX_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Fernet cipher bound to one key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FernetCipher {
    signing_key: [u8; HALF_KEY_LEN],
    encryption_key: [u8; HALF_KEY_LEN],
}

impl FernetCipher {
    /// Build a cipher from a decoded 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if `key` is not [`KEY_LEN`] bytes.
    pub fn new(key: &SecretKey) -> Result<Self, CryptoError> {
        if key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "fernet key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let mut signing_key = [0u8; HALF_KEY_LEN];
        let mut encryption_key = [0u8; HALF_KEY_LEN];
        signing_key.copy_from_slice(&key.as_bytes()[..HALF_KEY_LEN]);
        encryption_key.copy_from_slice(&key.as_bytes()[HALF_KEY_LEN..]);
        Ok(Self {
            signing_key,
            encryption_key,
        })
    }

    /// Build a cipher from a url-safe base64 key as produced by [`FernetCipher::generate_key`].
    pub fn from_encoded_key(encoded: &str) -> Result<Self, CryptoError> {
        Self::new(&SecretKey::from_url_safe_base64(encoded)?)
    }

    /// Generate a fresh random key, url-safe base64 encoded.
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        let encoded = URL_SAFE.encode(key);
        key.zeroize();
        encoded
    }

    /// Encrypt `plaintext` into a Fernet token stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] only if the cipher state is unusable,
    /// which cannot happen for a cipher built through [`FernetCipher::new`].
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        self.encrypt_at(plaintext.as_bytes(), unix_now(), &iv)
    }

    fn encrypt_at(
        &self,
        plaintext: &[u8],
        timestamp: u64,
        iv: &[u8; IV_LEN],
    ) -> Result<String, CryptoError> {
        let ciphertext = Aes128CbcEnc::new_from_slices(&self.encryption_key, iv)
            .map_err(|_| CryptoError::InvalidKey("bad AES key or IV length".into()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut token = Vec::with_capacity(PREAMBLE_LEN + ciphertext.len() + TAG_LEN);
        token.push(VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(iv);
        token.extend_from_slice(&ciphertext);

        let mut mac = self.mac()?;
        mac.update(&token);
        token.extend_from_slice(&mac.finalize().into_bytes());

        Ok(URL_SAFE.encode(token))
    }

    /// Decrypt a Fernet token without an age limit.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Authentication`] if the token is not base64, is
    /// truncated, has the wrong version byte, or fails HMAC verification.
    /// Returns [`CryptoError::Encoding`] if the plaintext is not UTF-8.
    pub fn decrypt(&self, token: &str) -> Result<String, CryptoError> {
        self.decrypt_checked(token, None)
    }

    /// Decrypt a Fernet token, rejecting it if it is older than `ttl` or
    /// stamped too far in the future.
    pub fn decrypt_with_ttl(&self, token: &str, ttl: Duration) -> Result<String, CryptoError> {
        self.decrypt_checked(token, Some((ttl, unix_now())))
    }

    fn decrypt_checked(
        &self,
        token: &str,
        time_check: Option<(Duration, u64)>,
    ) -> Result<String, CryptoError> {
        let data = URL_SAFE
            .decode(token)
            .map_err(|_| CryptoError::Authentication)?;
        if data.len() < PREAMBLE_LEN + TAG_LEN || data[0] != VERSION {
            return Err(CryptoError::Authentication);
        }

        let mut ts_bytes = [0u8; TIMESTAMP_LEN];
        ts_bytes.copy_from_slice(&data[1..1 + TIMESTAMP_LEN]);
        let timestamp = u64::from_be_bytes(ts_bytes);

        if let Some((ttl, now)) = time_check {
            if timestamp.saturating_add(ttl.as_secs()) < now {
                return Err(CryptoError::Authentication);
            }
            if now.saturating_add(MAX_CLOCK_SKEW.as_secs()) < timestamp {
                return Err(CryptoError::Authentication);
            }
        }

        let (signed, tag) = data.split_at(data.len() - TAG_LEN);
        let mut mac = self.mac()?;
        mac.update(signed);
        mac.verify_slice(tag)
            .map_err(|_| CryptoError::Authentication)?;

        let iv = &signed[1 + TIMESTAMP_LEN..PREAMBLE_LEN];
        let ciphertext = &signed[PREAMBLE_LEN..];
        let plaintext = Aes128CbcDec::new_from_slices(&self.encryption_key, iv)
            .map_err(|_| CryptoError::InvalidKey("bad AES key or IV length".into()))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::Authentication)?;

        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::Encoding("decrypted value is not valid UTF-8".into()))
    }

    fn mac(&self) -> Result<HmacSha256, CryptoError> {
        <HmacSha256 as Mac>::new_from_slice(&self.signing_key)
            .map_err(|_| CryptoError::InvalidKey("bad HMAC key length".into()))
    }
}

impl std::fmt::Debug for FernetCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FernetCipher([REDACTED])")
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
