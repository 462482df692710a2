//! Common types, scheme definitions, and errors shared across `krill-encrypt` crates.

pub mod error;
pub mod scheme;

pub use error::CryptoError;
pub use scheme::CipherScheme;
