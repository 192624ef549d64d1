//! # Element Id Escaping
//!
//! Every tooltip element id is derived from the post-redirect target title.
//! Bytes outside `[0-9A-Za-z]` are written as `_` + lowercase hex + `-`, so
//! the result is safe in any attribute or selector and decodes back exactly.
//!
//! ```text
//! "User:Al ice" -> "User_3a-Al_20-ice"
//! ```

use crate::error::{WireError, WireResult};
use crate::title::PageTitle;
use std::fmt;

/// Escapes a title into an element id. Deterministic and byte-oriented.
#[must_use]
pub fn encode_element_id(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(char::from(byte));
        } else {
            out.push('_');
            out.push_str(&format!("{byte:x}"));
            out.push('-');
        }
    }
    out
}

/// Reverses [`encode_element_id`].
///
/// # Errors
///
/// Returns [`WireError::InvalidElementId`] for unterminated or non-hex escapes,
/// raw bytes that should have been escaped, or output that is not UTF-8.
pub fn decode_element_id(input: &str) -> WireResult<String> {
    let invalid = || WireError::InvalidElementId(input.to_string());
    let mut bytes = Vec::with_capacity(input.len());
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c == '_' {
            let end = rest.find('-').ok_or_else(invalid)?;
            let hex = &rest[1..end];
            if hex.is_empty() || hex.len() > 2 {
                return Err(invalid());
            }
            bytes.push(u8::from_str_radix(hex, 16).map_err(|_| invalid())?);
            rest = &rest[end + 1..];
        } else if c.is_ascii_alphanumeric() {
            // ASCII alphanumerics are single bytes.
            #[allow(clippy::cast_possible_truncation)]
            bytes.push(c as u8);
            rest = &rest[1..];
        } else {
            return Err(invalid());
        }
    }

    String::from_utf8(bytes).map_err(|_| invalid())
}

/// An escaped element id identifying one tooltip on the page.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    /// Derives the id from a (post-redirect) target. The fragment is ignored,
    /// so links to different sections of one page share one tooltip.
    #[must_use]
    pub fn from_title(title: &PageTitle) -> Self {
        Self(encode_element_id(&title.prefixed_text()))
    }

    /// Wraps an id that is already escaped.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidElementId`] if the text is not a valid escape.
    pub fn from_encoded(encoded: &str) -> WireResult<Self> {
        decode_element_id(encoded)?;
        Ok(Self(encoded.to_string()))
    }

    /// Returns the escaped id.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the title text this id was derived from.
    ///
    /// # Errors
    ///
    /// Never fails for ids built through this type's constructors.
    pub fn decoded(&self) -> WireResult<String> {
        decode_element_id(&self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphanumerics_pass_through() {
        assert_eq!(encode_element_id("Foo123bar"), "Foo123bar");
    }

    #[test]
    fn test_specials_escaped_without_padding() {
        assert_eq!(encode_element_id("User:Al ice"), "User_3a-Al_20-ice");
        assert_eq!(encode_element_id("a\tb"), "a_9-b");
        assert_eq!(encode_element_id("_-"), "_5f-_2d-");
    }

    #[test]
    fn test_multibyte_escaped_per_byte() {
        assert_eq!(encode_element_id("é"), "_c3-_a9-");
        assert_eq!(decode_element_id("_c3-_a9-").unwrap(), "é");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let input = "Tooltip:Foo bar/baz (1)";
        assert_eq!(encode_element_id(input), encode_element_id(input));
        assert_eq!(decode_element_id(&encode_element_id(input)).unwrap(), input);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_element_id("_3a").is_err(), "unterminated escape");
        assert!(decode_element_id("_zz-").is_err(), "non-hex escape");
        assert!(decode_element_id("_-").is_err(), "empty escape");
        assert!(decode_element_id("a b").is_err(), "raw space");
        assert!(decode_element_id("_c3-").is_err(), "truncated utf-8");
    }

    #[test]
    fn test_element_id_ignores_fragment() {
        let a = ElementId::from_title(&PageTitle::parse("Foo bar#One").unwrap());
        let b = ElementId::from_title(&PageTitle::parse("Foo_bar#Two").unwrap());
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Foo_20-bar");
        assert_eq!(a.decoded().unwrap(), "Foo bar");
    }
}
