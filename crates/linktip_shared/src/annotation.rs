//! # Link Annotation
//!
//! The attribute set the renderer attaches to a tooltip-eligible link.
//!
//! ## Format
//!
//! ```text
//! class="to_hasTooltip"
//! data-to-id="Foo_20-bar"                  escaped post-redirect target
//! data-to-flags="fIem"                     canLateFollow isImage emptyTitle missingPage
//! data-to-titles="Foo bar#Sec|Old foo|Tooltip:Foo bar"
//!                 target+fragment | direct target | tooltip title
//! ```
//!
//! Each flag is one letter, uppercase when set. The titles string always has
//! three fields; an empty field means "not known" or "same as target".

use crate::error::{WireError, WireResult};
use crate::escape::ElementId;

/// CSS class marking a link that carries a tooltip.
pub const TOOLTIP_CLASS: &str = "to_hasTooltip";
/// Attribute holding the element id.
pub const ATTR_ID: &str = "data-to-id";
/// Attribute holding the flag string.
pub const ATTR_FLAGS: &str = "data-to-flags";
/// Attribute holding the titles string.
pub const ATTR_TITLES: &str = "data-to-titles";

const FLAG_LETTERS: [char; 4] = ['f', 'i', 'e', 'm'];

/// Outcome flags of the early phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TooltipFlags {
    /// Redirect follow is still allowed on the client.
    pub can_late_follow: bool,
    /// The tooltip page is a file and its content should be preloaded.
    pub is_image: bool,
    /// Title derivation produced the empty string; show the empty-title fallback.
    pub empty_title: bool,
    /// The tooltip page does not exist; show the missing-page fallback.
    pub missing_page: bool,
}

impl TooltipFlags {
    #[inline]
    const fn as_array(self) -> [bool; 4] {
        [
            self.can_late_follow,
            self.is_image,
            self.empty_title,
            self.missing_page,
        ]
    }

    /// Encodes the flags as four letters.
    #[must_use]
    pub fn encode(self) -> String {
        FLAG_LETTERS
            .iter()
            .zip(self.as_array())
            .map(|(letter, set)| if set { letter.to_ascii_uppercase() } else { *letter })
            .collect()
    }

    /// Decodes a flag string produced by [`TooltipFlags::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidFlags`] unless the input is exactly the four
    /// flag letters in order, each in either case.
    pub fn decode(input: &str) -> WireResult<Self> {
        let chars: Vec<char> = input.chars().collect();
        if chars.len() != FLAG_LETTERS.len() {
            return Err(WireError::InvalidFlags(input.to_string()));
        }
        let mut set = [false; 4];
        for (i, (c, letter)) in chars.iter().zip(FLAG_LETTERS).enumerate() {
            if *c == letter {
                set[i] = false;
            } else if *c == letter.to_ascii_uppercase() {
                set[i] = true;
            } else {
                return Err(WireError::InvalidFlags(input.to_string()));
            }
        }
        Ok(Self {
            can_late_follow: set[0],
            is_image: set[1],
            empty_title: set[2],
            missing_page: set[3],
        })
    }
}

/// Titles the client needs for placeholders and for its requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkTitles {
    /// Post-redirect target, with fragment.
    pub target: String,
    /// Direct target with fragment, only when a redirect was followed.
    pub direct: Option<String>,
    /// Tooltip page title, when already derived.
    pub tooltip: Option<String>,
}

impl LinkTitles {
    /// Encodes the titles as `target|direct|tooltip`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}|{}|{}",
            self.target,
            self.direct.as_deref().unwrap_or_default(),
            self.tooltip.as_deref().unwrap_or_default()
        )
    }

    /// Decodes a titles string.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidTitles`] unless there are exactly three
    /// fields and the first is non-empty.
    pub fn decode(input: &str) -> WireResult<Self> {
        let fields: Vec<&str> = input.split('|').collect();
        match fields.as_slice() {
            [target, direct, tooltip] if !target.is_empty() => Ok(Self {
                target: (*target).to_string(),
                direct: non_empty(direct),
                tooltip: non_empty(tooltip),
            }),
            _ => Err(WireError::InvalidTitles(input.to_string())),
        }
    }
}

fn non_empty(field: &str) -> Option<String> {
    (!field.is_empty()).then(|| field.to_string())
}

/// Everything the client learns about one link at render time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkAnnotation {
    /// Escaped id shared by every link to the same target page.
    pub element_id: ElementId,
    /// Early-phase outcome flags.
    pub flags: TooltipFlags,
    /// Titles for placeholders and requests.
    pub titles: LinkTitles,
}

impl LinkAnnotation {
    /// Returns the HTML attributes to add to the link, in a stable order.
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("class", TOOLTIP_CLASS.to_string()),
            (ATTR_ID, self.element_id.as_str().to_string()),
            (ATTR_FLAGS, self.flags.encode()),
            (ATTR_TITLES, self.titles.encode()),
        ]
    }

    /// Reads an annotation back from link attributes.
    ///
    /// # Errors
    ///
    /// Returns a [`WireError`] if an attribute is missing or malformed.
    pub fn from_attributes<'a, I>(attributes: I) -> WireResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut id = None;
        let mut flags = None;
        let mut titles = None;
        for (name, value) in attributes {
            match name {
                ATTR_ID => id = Some(ElementId::from_encoded(value)?),
                ATTR_FLAGS => flags = Some(TooltipFlags::decode(value)?),
                ATTR_TITLES => titles = Some(LinkTitles::decode(value)?),
                _ => {}
            }
        }
        Ok(Self {
            element_id: id.ok_or_else(|| WireError::InvalidElementId(String::new()))?,
            flags: flags.ok_or_else(|| WireError::InvalidFlags(String::new()))?,
            titles: titles.ok_or_else(|| WireError::InvalidTitles(String::new()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::title::PageTitle;

    #[test]
    fn test_flag_letters_and_case() {
        let flags = TooltipFlags {
            can_late_follow: false,
            is_image: true,
            empty_title: false,
            missing_page: true,
        };
        assert_eq!(flags.encode(), "fIeM");
        assert_eq!(TooltipFlags::default().encode(), "fiem");
        assert_eq!(TooltipFlags::decode("fIeM").unwrap(), flags);
    }

    #[test]
    fn test_flag_decode_is_strict() {
        for bad in ["", "fie", "fiemx", "ifem", "fxem"] {
            assert!(TooltipFlags::decode(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_titles_empty_fields() {
        let titles = LinkTitles {
            target: "Foo#Bar".into(),
            direct: None,
            tooltip: Some("Tooltip:Foo".into()),
        };
        assert_eq!(titles.encode(), "Foo#Bar||Tooltip:Foo");
        assert_eq!(LinkTitles::decode("Foo#Bar||Tooltip:Foo").unwrap(), titles);
    }

    #[test]
    fn test_titles_decode_rejects_wrong_shape() {
        assert!(LinkTitles::decode("Foo|Bar").is_err());
        assert!(LinkTitles::decode("|Bar|Baz").is_err());
        assert!(LinkTitles::decode("a|b|c|d").is_err());
    }

    #[test]
    fn test_attributes_read_back() {
        let annotation = LinkAnnotation {
            element_id: ElementId::from_title(&PageTitle::parse("Foo bar").unwrap()),
            flags: TooltipFlags {
                can_late_follow: true,
                ..TooltipFlags::default()
            },
            titles: LinkTitles {
                target: "Foo bar".into(),
                direct: Some("Old foo".into()),
                tooltip: None,
            },
        };
        let attributes = annotation.attributes();
        assert_eq!(attributes[0], ("class", TOOLTIP_CLASS.to_string()));
        let parsed = LinkAnnotation::from_attributes(
            attributes.iter().map(|(name, value)| (*name, value.as_str())),
        )
        .unwrap();
        assert_eq!(parsed, annotation);
    }

    #[test]
    fn test_missing_attribute_is_error() {
        let result = LinkAnnotation::from_attributes([(ATTR_ID, "Foo"), (ATTR_FLAGS, "fiem")]);
        assert!(matches!(result, Err(WireError::InvalidTitles(_))));
    }
}
