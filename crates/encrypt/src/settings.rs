//! Host settings adapter.
//!
//! Reads the handler name and key material from environment variables and
//! turns them into an [`EncryptionFacade`]. This is the only place that touches
//! configuration; everything else takes its keys explicitly.
//!
//! | variable                    | meaning                                        |
//! |-----------------------------|------------------------------------------------|
//! | `BKKRILL_ENCRYPT_HANDLER`   | `NationEncryptHandler` selects the national scheme |
//! | `BKKRILL_SECRET_KEY`        | Fernet key, url-safe base64 of 32 bytes        |
//! | `BKKRILL_NATION_CIPHER_KEY` | SM4 key, base64 of 16 bytes                    |

use std::ffi::OsString;

use common::CryptoError;
use config::{builder::DefaultState, ConfigBuilder};
use serde::Deserialize;
use tracing::warn;

use crate::crypto::Sm4Cipher;
use crate::facade::EncryptionFacade;
use crate::key::SecretKey;
use crate::registry::{CipherRegistry, DEFAULT_CIPHER};
use crate::selector::BackendSelector;

/// Prefix shared by every encryption setting variable.
pub const ENV_PREFIX: &str = "BKKRILL_";

/// Encryption settings as read from the host.
#[derive(Clone, Default, Deserialize)]
pub struct Settings {
    /// Handler name; see [`crate::selector::resolve_scheme`].
    #[serde(default)]
    pub bkkrill_encrypt_handler: Option<String>,

    /// Encoded Fernet key for the standard scheme.
    #[serde(default)]
    pub bkkrill_secret_key: Option<String>,

    /// Encoded SM4 key registered as the default national cipher.
    #[serde(default)]
    pub bkkrill_nation_cipher_key: Option<String>,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Never fails: if the environment cannot be read the empty settings are
    /// returned and the standard scheme will be selected. Only `BKKRILL_*`
    /// variables are read, and variables that are not UTF-8 are ignored.
    pub fn load() -> Self {
        let env = config::Environment::default().source(Some(environment_source(&[ENV_PREFIX])));
        Self::from_builder(config::Config::builder().add_source(env))
    }

    /// Load settings from an arbitrary configuration builder.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Self {
        match builder.build().and_then(|cfg| cfg.try_deserialize::<Settings>()) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "encryption settings unreadable; using defaults");
                Self::default()
            }
        }
    }

    pub fn handler(&self) -> Option<&str> {
        self.bkkrill_encrypt_handler.as_deref()
    }

    /// Registry holding the default national cipher, if a key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the configured key is malformed.
    pub fn cipher_registry(&self) -> Result<CipherRegistry, CryptoError> {
        let mut registry = CipherRegistry::new();
        if let Some(encoded) = non_empty(&self.bkkrill_nation_cipher_key) {
            let key = SecretKey::from_base64(encoded)?;
            registry.register(DEFAULT_CIPHER, Sm4Cipher::new(&key)?);
        }
        Ok(registry)
    }

    /// Selector provisioned with every configured key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if a configured key is malformed.
    pub fn selector(&self) -> Result<BackendSelector, CryptoError> {
        let mut selector = BackendSelector::new(self.cipher_registry()?);
        if let Some(encoded) = non_empty(&self.bkkrill_secret_key) {
            selector = selector.with_secret_key(SecretKey::from_url_safe_base64(encoded)?);
        }
        Ok(selector)
    }

    /// Facade for the configured handler.
    pub fn encryption_facade(&self) -> Result<EncryptionFacade, CryptoError> {
        self.selector()?.select(self.handler())
    }
}

/// Process environment variables whose names start with one of `prefixes`.
///
/// Reads through [`std::env::vars_os`], so a variable that is not UTF-8 is
/// skipped instead of aborting the process. Feed the result to
/// [`config::Environment::source`].
pub fn environment_source(prefixes: &[&str]) -> config::Map<String, String> {
    utf8_vars(std::env::vars_os(), prefixes)
}

fn utf8_vars<I>(vars: I, prefixes: &[&str]) -> config::Map<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .filter(|(name, _)| prefixes.iter().any(|p| name.starts_with(p)))
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Settings")
            .field("bkkrill_encrypt_handler", &self.bkkrill_encrypt_handler)
            .field("bkkrill_secret_key", &redact(&self.bkkrill_secret_key))
            .field("bkkrill_nation_cipher_key", &redact(&self.bkkrill_nation_cipher_key))
            .finish()
    }
}
