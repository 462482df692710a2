//! Cipher scheme identifiers and their wire headers.
//!
//! Every value written by the facade starts with the header of the scheme that
//! produced it:
//!
//! ```text
//! bkcrypt$<fernet token>
//! nationcrypto$<national cipher output>
//! <legacy 3DES output>            (no header)
//! ```
//!
//! These strings are persisted by callers and must never change.

use std::fmt;

/// Header of values produced by the standard (Fernet) scheme.
pub const STANDARD_HEADER: &str = "bkcrypt$";

/// Header of values produced by the national scheme.
pub const NATIONAL_HEADER: &str = "nationcrypto$";

/// Handler name that selects the national scheme.
pub const NATIONAL_HANDLER_NAME: &str = "NationEncryptHandler";

/// The cipher family that produced an encrypted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherScheme {
    /// International-standard authenticated cipher (Fernet).
    Standard,
    /// National-standard cipher resolved from the cipher registry.
    National,
    /// Pre-header fixed-key cipher; values carry no header.
    Legacy,
}

impl CipherScheme {
    /// Schemes that write a header, in match order.
    pub const HEADERED: [CipherScheme; 2] = [CipherScheme::Standard, CipherScheme::National];

    /// Wire header for this scheme. Empty for [`CipherScheme::Legacy`].
    pub fn header(self) -> &'static str {
        match self {
            CipherScheme::Standard => STANDARD_HEADER,
            CipherScheme::National => NATIONAL_HEADER,
            CipherScheme::Legacy => "",
        }
    }
}

impl fmt::Display for CipherScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CipherScheme::Standard => "standard",
            CipherScheme::National => "national",
            CipherScheme::Legacy => "legacy",
        })
    }
}
