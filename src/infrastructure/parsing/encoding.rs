//! Declared character encodings accepted by the pipeline
//!
//! Labels follow the WHATWG Encoding Standard, so `latin1` and `us-ascii`
//! decode as windows-1252 exactly like a browser would.

use encoding_rs::{Encoding, REPLACEMENT};
use tracing::debug;

use crate::infrastructure::parsing_error::{ExtractionError, ExtractionResult};

/// A recognized, decodable character encoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charset(&'static Encoding);

impl Charset {
    pub const fn encoding(self) -> &'static Encoding {
        self.0
    }

    /// Canonical WHATWG name, e.g. `windows-1252`
    pub fn name(self) -> &'static str {
        self.0.name()
    }
}

/// Map a declared charset label (HTTP header or `<meta>`) to a [`Charset`]
///
/// Labels mapped to the WHATWG replacement encoding are rejected as well:
/// nothing readable can be decoded from them.
pub fn validate_charset(label: &str) -> ExtractionResult<Charset> {
    let trimmed = label.trim().trim_matches(['"', '\'']);
    match Encoding::for_label(trimmed.as_bytes()) {
        Some(encoding) if encoding != REPLACEMENT => Ok(Charset(encoding)),
        _ => Err(ExtractionError::encoding_unsupported(label)),
    }
}

/// Decode a raw body; a byte order mark overrides the declared charset and
/// malformed sequences become U+FFFD
pub fn decode_bytes(bytes: &[u8], charset: Charset) -> String {
    let (text, actual, had_errors) = charset.encoding().decode(bytes);
    if had_errors {
        debug!("Malformed {} sequences replaced while decoding", actual.name());
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("UTF-8", "UTF-8")]
    #[case(" \"iso-8859-1\" ", "windows-1252")]
    #[case("cp1252", "windows-1252")]
    #[case("ISO-8859-15", "ISO-8859-15")]
    #[case("windows-1250", "windows-1250")]
    #[case("utf-16", "UTF-16LE")]
    #[case("Shift_JIS", "Shift_JIS")]
    fn test_validate_known_labels(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(validate_charset(label).unwrap().name(), expected);
    }

    #[rstest]
    #[case("x-mac-klingon")]
    #[case("")]
    #[case("iso-2022-kr")]
    fn test_unknown_label_is_unsupported(#[case] label: &str) {
        let err = validate_charset(label).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::EncodingUnsupported {
                encoding: label.to_string()
            }
        );
    }

    #[test]
    fn test_decode_legacy_charsets() {
        let latin1 = validate_charset("latin1").unwrap();
        assert_eq!(decode_bytes(b"Mart\xednez", latin1), "Martínez");
        assert_eq!(decode_bytes(b"\x93Pepe\x94", latin1), "“Pepe”");

        let latin9 = validate_charset("ISO-8859-15").unwrap();
        assert_eq!(decode_bytes(b"\xa4 Pe\xf1a", latin9), "€ Peña");

        let utf8 = validate_charset("utf-8").unwrap();
        assert_eq!(decode_bytes("Peña".as_bytes(), utf8), "Peña");
    }
}
