//! `krill-encrypt`: header-tagged encryption of sensitive string values.
//!
//! Every value written carries a short prefix naming the scheme that produced
//! it, so stored values can be migrated between algorithms and re-encryption
//! is a no-op.
//!
//! ```text
//! bkcrypt$<fernet token>            standard scheme
//! nationcrypto$<sm4 ciphertext>     national scheme
//! <3des ciphertext>                 legacy, read-only
//! ```
//!
//! Typical use at process start:
//!
//! ```no_run
//! let facade = krill_encrypt::Settings::load().encryption_facade()?;
//! let stored = facade.encrypt("db-password")?;
//! assert_eq!(facade.decrypt(&stored)?, "db-password");
//! # Ok::<(), krill_encrypt::CryptoError>(())
//! ```
//!
//! # Telemetry invariants
//!
//! - **No plaintext, ciphertext or key material** appears in any log field.

pub mod backend;
pub mod crypto;
pub mod facade;
pub mod header;
pub mod key;
pub mod registry;
pub mod selector;
pub mod settings;

pub use backend::CipherBackend;
pub use common::{CipherScheme, CryptoError};
pub use crypto::{legacy_decrypt, legacy_encrypt, FernetCipher, Sm4Cipher};
pub use facade::{EncryptionFacade, Migration};
pub use header::HeaderCodec;
pub use key::SecretKey;
pub use registry::{CipherRegistry, SymmetricCipher, DEFAULT_CIPHER};
pub use selector::{resolve_scheme, BackendSelector};
pub use settings::Settings;
