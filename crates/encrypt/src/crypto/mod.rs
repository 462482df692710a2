//! Cipher primitives behind the facade.
//!
//! This module is free of configuration and header handling. It provides the
//! raw string-in / string-out operations used by the backends:
//!
//! - [`fernet`]: the standard scheme, Fernet tokens.
//! - [`sm4`]: the built-in national cipher, SM4 under GCM-SIV.
//! - [`legacy`]: the header-less fixed-key 3DES codec.

pub mod fernet;
pub mod legacy;
pub mod sm4;

pub use fernet::FernetCipher;
pub use legacy::{legacy_decrypt, legacy_encrypt};
pub use sm4::Sm4Cipher;
