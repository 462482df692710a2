//! Scheme headers on encrypted strings.
//!
//! A header is a plain string prefix, not a length-prefixed or binary tag, so
//! values written before this crate existed still parse. Values with no known
//! header are treated as [`CipherScheme::Legacy`].
//!
//! Payloads are never inspected. If an encoded payload happened to begin with
//! another scheme's header it would be misclassified; the base64 alphabets used
//! by both backends cannot produce `$`, so the current headers are unambiguous
//! for every value this crate writes.

use common::CipherScheme;

/// Prepend `scheme`'s header to `payload`.
pub fn add_header(scheme: CipherScheme, payload: &str) -> String {
    let header = scheme.header();
    let mut out = String::with_capacity(header.len() + payload.len());
    out.push_str(header);
    out.push_str(payload);
    out
}

/// Split a known header off `text`.
///
/// Returns the matching scheme and the remainder, or `(None, text)` when no
/// header is present.
pub fn split_header(text: &str) -> (Option<CipherScheme>, &str) {
    for scheme in CipherScheme::HEADERED {
        if let Some(payload) = text.strip_prefix(scheme.header()) {
            return (Some(scheme), payload);
        }
    }
    (None, text)
}

/// Scheme that produced `text`, falling back to [`CipherScheme::Legacy`].
pub fn classify(text: &str) -> CipherScheme {
    split_header(text).0.unwrap_or(CipherScheme::Legacy)
}

/// Header codec bound to a single scheme.
///
/// Only the bound scheme's header is recognised; foreign headers are left in
/// place and handed to the backend as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCodec {
    scheme: CipherScheme,
}

impl HeaderCodec {
    pub fn new(scheme: CipherScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> CipherScheme {
        self.scheme
    }

    pub fn header(&self) -> &'static str {
        self.scheme.header()
    }

    pub fn add_header(&self, payload: &str) -> String {
        add_header(self.scheme, payload)
    }

    /// `true` if `text` starts with this codec's header. Always `false` for
    /// the header-less legacy scheme.
    pub fn contains_header(&self, text: &str) -> bool {
        let header = self.header();
        !header.is_empty() && text.starts_with(header)
    }

    /// Strip this codec's header from `text`.
    ///
    /// Unprefixed text and text carrying a different scheme's header come back
    /// unchanged with `None`.
    pub fn strip_header<'a>(&self, text: &'a str) -> (Option<CipherScheme>, &'a str) {
        if self.contains_header(text) {
            (Some(self.scheme), &text[self.header().len()..])
        } else {
            (None, text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_standard_header() {
        let codec = HeaderCodec::new(CipherScheme::Standard);
        assert!(codec.contains_header("bkcrypt$XYZ"));
        assert!(!codec.contains_header("XYZ"));
        assert!(!codec.contains_header("nationcrypto$XYZ"));
    }

    #[test]
    fn strip_standard_header() {
        let codec = HeaderCodec::new(CipherScheme::Standard);
        assert_eq!(
            codec.strip_header("bkcrypt$XYZ"),
            (Some(CipherScheme::Standard), "XYZ")
        );
        assert_eq!(codec.strip_header("plain"), (None, "plain"));
    }

    #[test]
    fn foreign_header_passes_through() {
        let codec = HeaderCodec::new(CipherScheme::National);
        assert_eq!(codec.strip_header("bkcrypt$XYZ"), (None, "bkcrypt$XYZ"));
    }

    #[test]
    fn only_leading_header_is_stripped() {
        let codec = HeaderCodec::new(CipherScheme::Standard);
        assert_eq!(
            codec.strip_header("bkcrypt$bkcrypt$XYZ"),
            (Some(CipherScheme::Standard), "bkcrypt$XYZ")
        );
        assert!(!codec.contains_header("xbkcrypt$"));
    }

    #[test]
    fn add_header_prepends() {
        assert_eq!(add_header(CipherScheme::National, "abc"), "nationcrypto$abc");
        assert_eq!(
            HeaderCodec::new(CipherScheme::Standard).add_header(""),
            "bkcrypt$"
        );
    }

    #[test]
    fn legacy_codec_never_matches() {
        let codec = HeaderCodec::new(CipherScheme::Legacy);
        assert!(!codec.contains_header("anything"));
        assert!(!codec.contains_header(""));
        assert_eq!(codec.add_header("40Ot6vrbuGI="), "40Ot6vrbuGI=");
        assert_eq!(codec.strip_header("40Ot6vrbuGI="), (None, "40Ot6vrbuGI="));
    }

    #[test]
    fn split_recognises_any_known_header() {
        assert_eq!(
            split_header("bkcrypt$XYZ"),
            (Some(CipherScheme::Standard), "XYZ")
        );
        assert_eq!(
            split_header("nationcrypto$XYZ"),
            (Some(CipherScheme::National), "XYZ")
        );
        assert_eq!(split_header("plain"), (None, "plain"));
        assert_eq!(split_header(""), (None, ""));
    }

    #[test]
    fn classify_falls_back_to_legacy() {
        assert_eq!(classify("bkcrypt$abc"), CipherScheme::Standard);
        assert_eq!(classify("nationcrypto$abc"), CipherScheme::National);
        assert_eq!(classify("40Ot6vrbuGI="), CipherScheme::Legacy);
    }

    #[test]
    fn multibyte_text_is_handled() {
        let codec = HeaderCodec::new(CipherScheme::Standard);
        assert_eq!(codec.strip_header("密文"), (None, "密文"));
        assert_eq!(
            codec.strip_header("bkcrypt$密文"),
            (Some(CipherScheme::Standard), "密文")
        );
    }
}
