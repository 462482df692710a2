//! `krill-migrate` — moves header-less legacy values onto the configured scheme.
//!
//! Startup sequence:
//! 1. Load and validate [`config::Config`] from environment variables.
//! 2. Initialise structured JSON logging on stderr.
//! 3. Build the encryption facade from the host settings.
//! 4. Stream stdin to stdout, one value per line.

mod config;
mod migrate;
mod telemetry;

use std::io;

use anyhow::{Context, Result};
use krill_encrypt::Settings;
use tracing::info;

use migrate::Migrator;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: krill-migrate configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Facade
    // -----------------------------------------------------------------------
    let facade = Settings::load()
        .encryption_facade()
        .context("failed to build encryption facade from settings")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        scheme = %facade.scheme(),
        skip_invalid = cfg.migrate_skip_invalid,
        "krill-migrate starting"
    );

    // -----------------------------------------------------------------------
    // 4. Migration pass
    // -----------------------------------------------------------------------
    let summary = Migrator::new(&facade, &cfg.bkkrill_legacy_key)
        .skip_invalid(cfg.migrate_skip_invalid)
        .run(io::stdin().lock(), io::stdout().lock())?;

    info!(
        migrated = summary.migrated,
        unchanged = summary.unchanged,
        foreign = summary.foreign,
        skipped = summary.skipped,
        "migration complete"
    );
    Ok(())
}
