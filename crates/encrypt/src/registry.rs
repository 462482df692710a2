//! Named registry of national ciphers.
//!
//! The host decides which algorithm backs the national scheme by registering a
//! [`SymmetricCipher`] under a name; the facade looks up [`DEFAULT_CIPHER`].

use std::{collections::HashMap, sync::Arc};

use common::CryptoError;

/// Registry entry used by the national backend.
pub const DEFAULT_CIPHER: &str = "default";

/// String-in / string-out cipher capability.
///
/// Implementations are shared across threads and must report malformed or
/// tampered input as an error rather than returning garbage.
#[cfg_attr(test, mockall::automock)]
pub trait SymmetricCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError>;
    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError>;
}

/// Ciphers keyed by configuration name.
#[derive(Clone, Default)]
pub struct CipherRegistry {
    ciphers: HashMap<String, Arc<dyn SymmetricCipher>>,
}

impl CipherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the cipher stored under `name`.
    pub fn register<C>(&mut self, name: impl Into<String>, cipher: C) -> &mut Self
    where
        C: SymmetricCipher + 'static,
    {
        self.register_shared(name, Arc::new(cipher))
    }

    /// Register an already shared cipher under `name`.
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        cipher: Arc<dyn SymmetricCipher>,
    ) -> &mut Self {
        self.ciphers.insert(name.into(), cipher);
        self
    }

    /// Look up the cipher registered under `using`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CipherNotRegistered`] if nothing is registered under that name.
    pub fn cipher(&self, using: &str) -> Result<Arc<dyn SymmetricCipher>, CryptoError> {
        self.ciphers
            .get(using)
            .cloned()
            .ok_or_else(|| CryptoError::CipherNotRegistered(using.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ciphers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.ciphers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphers.is_empty()
    }
}

impl std::fmt::Debug for CipherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.ciphers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CipherRegistry")
            .field("ciphers", &names)
            .finish()
    }
}
