//! Configuration loading and validation for the migration tool.
//!
//! Encryption settings (`BKKRILL_ENCRYPT_HANDLER`, `BKKRILL_SECRET_KEY`,
//! `BKKRILL_NATION_CIPHER_KEY`) are read separately by
//! [`krill_encrypt::Settings`]; this struct holds only what the migration
//! pass itself needs.

use anyhow::{Context, Result};
use krill_encrypt::crypto::legacy::KEY_LEN as LEGACY_KEY_LEN;
use krill_encrypt::settings::environment_source;
use serde::Deserialize;

/// Environment variables this tool reads.
const ENV_VARS: [&str; 3] = ["BKKRILL_LEGACY_KEY", "MIGRATE_SKIP_INVALID", "LOG_LEVEL"];

/// Validated migration configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Key of the header-less legacy codec. **Required.**
    pub bkkrill_legacy_key: String,

    /// Pass values that fail legacy decryption through unchanged instead of aborting.
    #[serde(default)]
    pub migrate_skip_invalid: bool,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(environment_source(&ENV_VARS))
    }

    fn from_vars(vars: config::Map<String, String>) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().source(Some(vars)))
            .build()
            .context("failed to build krill-migrate configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise krill-migrate configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.bkkrill_legacy_key.len() != LEGACY_KEY_LEN {
            anyhow::bail!("BKKRILL_LEGACY_KEY must be exactly {LEGACY_KEY_LEN} bytes");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bkkrill_legacy_key", &"[REDACTED]")
            .field("migrate_skip_invalid", &self.migrate_skip_invalid)
            .field("log_level", &self.log_level)
            .finish()
    }
}
