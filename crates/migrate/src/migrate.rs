//! Line-oriented migration pass.
//!
//! Each input line is one stored value; exactly one line is written per input
//! line, in order:
//! - values already in the facade's scheme, and blank lines, are copied;
//! - values with a foreign header are copied and counted;
//! - header-less values are legacy-decrypted and re-encrypted.
//!
//! Values are never logged, only their line numbers.

use std::io::{BufRead, Write};

use common::{CipherScheme, CryptoError};
use krill_encrypt::{EncryptionFacade, Migration};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that abort a migration pass.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A header-less value could not be decrypted with the legacy key.
    #[error("line {line}: value could not be migrated: {source}")]
    InvalidValue {
        line: usize,
        #[source]
        source: CryptoError,
    },

    /// Reading input or writing output failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-outcome counts for one pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub migrated: usize,
    pub unchanged: usize,
    pub foreign: usize,
    pub skipped: usize,
}

/// Migration pass over one facade and legacy key.
pub struct Migrator<'a> {
    facade: &'a EncryptionFacade,
    legacy_key: &'a str,
    skip_invalid: bool,
}

impl<'a> Migrator<'a> {
    pub fn new(facade: &'a EncryptionFacade, legacy_key: &'a str) -> Self {
        Self {
            facade,
            legacy_key,
            skip_invalid: false,
        }
    }

    /// Copy undecryptable values through instead of failing.
    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    /// Migrate every line of `reader` into `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::InvalidValue`] for the first value that fails
    /// legacy decryption (unless skipping is enabled), or [`MigrateError::Io`].
    pub fn run<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
    ) -> Result<Summary, MigrateError> {
        let mut summary = Summary::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;

            if line.trim().is_empty() {
                summary.unchanged += 1;
                writeln!(writer, "{line}")?;
                continue;
            }

            match self.facade.migrate_legacy(&line, self.legacy_key) {
                Ok(Migration::Migrated(value)) => {
                    summary.migrated += 1;
                    debug!(line = line_no, "migrated legacy value");
                    writeln!(writer, "{value}")?;
                }
                Ok(Migration::Current) => {
                    summary.unchanged += 1;
                    writeln!(writer, "{line}")?;
                }
                Ok(Migration::Foreign(scheme)) => {
                    summary.foreign += 1;
                    warn_foreign(line_no, scheme);
                    writeln!(writer, "{line}")?;
                }
                Err(e) if self.skip_invalid => {
                    summary.skipped += 1;
                    warn!(
                        line = line_no,
                        code = e.code(),
                        error = %e,
                        "value could not be migrated; copied unchanged"
                    );
                    writeln!(writer, "{line}")?;
                }
                Err(source) => {
                    warn!(line = line_no, code = source.code(), "migration aborted");
                    return Err(MigrateError::InvalidValue {
                        line: line_no,
                        source,
                    })
                }
            }
        }

        writer.flush()?;
        Ok(summary)
    }
}

fn warn_foreign(line: usize, scheme: CipherScheme) {
    warn!(line, %scheme, "value belongs to another scheme; copied unchanged");
}
