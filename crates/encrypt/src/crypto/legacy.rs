//! Fixed-key 3DES codec for values written before scheme headers existed.
//!
//! Only used to read historical values and to move them onto a headered
//! scheme. Output is deterministic: the IV is the first eight key bytes and
//! plaintext is right-padded with spaces to the block size.
//!
//! ```text
//! base64( tdes_ede3_cbc(key, iv = key[..8], plaintext + ' ' * pad) )
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use common::CryptoError;
use des::TdesEde3;

type TdesCbcEnc = cbc::Encryptor<TdesEde3>;
type TdesCbcDec = cbc::Decryptor<TdesEde3>;

/// Byte length of a legacy key.
pub const KEY_LEN: usize = 24;

const BLOCK_LEN: usize = 8;
const PAD_BYTE: u8 = b' ';

/// Encrypt `text` with the legacy codec.
///
/// Text whose length is already a multiple of eight gets a whole block of
/// spaces appended. No historical value of that length has been checked
/// against this; [`legacy_decrypt`] accepts both the padded and unpadded form.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKey`] if `key` is not [`KEY_LEN`] bytes.
pub fn legacy_encrypt(text: &str, key: &str) -> Result<String, CryptoError> {
    let key = check_key(key)?;

    let mut padded = text.as_bytes().to_vec();
    let pad = BLOCK_LEN - padded.len() % BLOCK_LEN;
    padded.resize(padded.len() + pad, PAD_BYTE);

    let ciphertext = TdesCbcEnc::new_from_slices(key, &key[..BLOCK_LEN])
        .map_err(|_| CryptoError::InvalidKey("legacy key rejected".into()))?
        .encrypt_padded_vec_mut::<NoPadding>(&padded);

    Ok(STANDARD.encode(ciphertext))
}

/// Decrypt a value produced by [`legacy_encrypt`].
///
/// Trailing spaces are removed from the result, including any that were part
/// of the original text.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKey`] if `key` is not [`KEY_LEN`] bytes, and
/// [`CryptoError::Encoding`] if `ciphertext` is not base64 of whole blocks or
/// does not decrypt to UTF-8.
pub fn legacy_decrypt(ciphertext: &str, key: &str) -> Result<String, CryptoError> {
    let key = check_key(key)?;

    let data = STANDARD
        .decode(ciphertext.trim())
        .map_err(|_| CryptoError::Encoding("legacy value is not base64".into()))?;
    if data.is_empty() || data.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::Encoding(format!(
            "legacy value must be a non-empty multiple of {BLOCK_LEN} bytes"
        )));
    }

    let mut plaintext = TdesCbcDec::new_from_slices(key, &key[..BLOCK_LEN])
        .map_err(|_| CryptoError::InvalidKey("legacy key rejected".into()))?
        .decrypt_padded_vec_mut::<NoPadding>(&data)
        .map_err(|_| CryptoError::Encoding("legacy value is not block aligned".into()))?;

    let trimmed = plaintext
        .iter()
        .rposition(|&b| b != PAD_BYTE)
        .map_or(0, |i| i + 1);
    plaintext.truncate(trimmed);

    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::Encoding("legacy value is not valid UTF-8".into()))
}

fn check_key(key: &str) -> Result<&[u8], CryptoError> {
    let bytes = key.as_bytes();
    if bytes.len() != KEY_LEN {
        return Err(CryptoError::InvalidKey(format!(
            "legacy key must be {KEY_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}
