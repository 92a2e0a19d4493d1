//! `Content-Disposition` encoding for arbitrary file names (RFC 6266).
//!
//! Every header carries two parameters:
//!
//! - `filename="..."`: ASCII only, with controls, non-ASCII bytes, quotes,
//!   backslashes and `%` percent-escaped. Old clients get a usable name.
//! - `filename*=UTF-8''...`: the exact UTF-8 bytes of the name, escaped per
//!   RFC 5987. Compliant clients recover the original name, including
//!   whichever Unicode normalization form it was requested in.

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters that cannot appear verbatim inside the quoted `filename`.
const QUOTED_UNSAFE: &AsciiSet = &CONTROLS.add(b'"').add(b'\\').add(b'%');

/// Everything outside RFC 5987 `attr-char`.
const ATTR_CHAR_UNSAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// ASCII fallback for the legacy `filename` parameter.
pub fn legacy_filename(name: &str) -> String {
    utf8_percent_encode(name, QUOTED_UNSAFE).to_string()
}

/// Percent-encoded value for the extended `filename*` parameter.
pub fn extended_filename(name: &str) -> String {
    utf8_percent_encode(name, ATTR_CHAR_UNSAFE).to_string()
}

/// Full `Content-Disposition` value for downloading `name`.
pub fn attachment(name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        legacy_filename(name),
        extended_filename(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    fn decode(value: &str) -> String {
        percent_decode_str(value).decode_utf8().unwrap().into_owned()
    }

    #[test]
    fn test_ascii_name_is_readable() {
        let name = "[B] Game1 Base [01234567890ABCDE][v0].nsp";
        assert_eq!(legacy_filename(name), name);
        assert_eq!(
            extended_filename(name),
            "%5BB%5D%20Game1%20Base%20%5B01234567890ABCDE%5D%5Bv0%5D.nsp"
        );
    }

    #[test]
    fn test_precomposed_diacritic() {
        let name = "[B] Abz\u{fb} [0100C1300BBC6000][v0-0].nsp";
        let header = attachment(name);

        assert!(header.is_ascii());
        assert!(header.contains("Abz%C3%BB"));
        assert_eq!(decode(&legacy_filename(name)), name);
        assert_eq!(decode(&extended_filename(name)), name);
    }

    #[test]
    fn test_decomposed_diacritic() {
        let name = "Abzu\u{302}.nsp";
        assert_eq!(extended_filename(name), "Abzu%CC%82.nsp");
        assert_eq!(legacy_filename(name), "Abzu%CC%82.nsp");
        assert_eq!(decode(&extended_filename(name)), name);
    }

    #[test]
    fn test_quoted_string_specials() {
        let name = "say \"hi\" 100%\\done\t.bin";
        let legacy = legacy_filename(name);

        assert!(!legacy.contains('"'));
        assert!(!legacy.contains('\\'));
        assert!(!legacy.contains('\t'));
        assert_eq!(decode(&legacy), name);
        assert_eq!(decode(&extended_filename(name)), name);
    }

    #[test]
    fn test_attachment_layout() {
        assert_eq!(
            attachment("a b.nsp"),
            "attachment; filename=\"a b.nsp\"; filename*=UTF-8''a%20b.nsp"
        );
    }
}
