//! Backend selection from the `BKKRILL_ENCRYPT_HANDLER` setting.
//!
//! | setting                    | scheme   |
//! |----------------------------|----------|
//! | `"NationEncryptHandler"`   | National |
//! | anything else, empty, unset| Standard |
//!
//! Selection itself never fails. Only provisioning the chosen backend can:
//! a missing or malformed key, or no registered national cipher.

use common::{scheme::NATIONAL_HANDLER_NAME, CipherScheme, CryptoError};
use tracing::debug;

use crate::facade::EncryptionFacade;
use crate::key::SecretKey;
use crate::registry::CipherRegistry;

/// Map a handler setting to the scheme it selects.
pub fn resolve_scheme(handler: Option<&str>) -> CipherScheme {
    match handler {
        Some(NATIONAL_HANDLER_NAME) => CipherScheme::National,
        _ => CipherScheme::Standard,
    }
}

/// Key material for every backend the selector may build.
#[derive(Debug, Clone, Default)]
pub struct BackendSelector {
    secret_key: Option<SecretKey>,
    registry: CipherRegistry,
}

impl BackendSelector {
    pub fn new(registry: CipherRegistry) -> Self {
        Self {
            secret_key: None,
            registry,
        }
    }

    /// Key used when the standard scheme is selected.
    pub fn with_secret_key(mut self, key: SecretKey) -> Self {
        self.secret_key = Some(key);
        self
    }

    /// Build the facade for `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the standard scheme is selected
    /// and no usable secret key was provided, or
    /// [`CryptoError::CipherNotRegistered`] if the national scheme is selected
    /// and the registry has no default cipher.
    pub fn select(&self, handler: Option<&str>) -> Result<EncryptionFacade, CryptoError> {
        let scheme = resolve_scheme(handler);
        debug!(%scheme, "selected encryption scheme");
        match scheme {
            CipherScheme::National => EncryptionFacade::national_from_registry(&self.registry),
            _ => {
                let key = self.secret_key.as_ref().ok_or_else(|| {
                    CryptoError::InvalidKey("no secret key provisioned for the standard scheme".into())
                })?;
                EncryptionFacade::standard(key)
            }
        }
    }
}
