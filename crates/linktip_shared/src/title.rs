//! # Page Titles
//!
//! A page is identified by a namespace plus title text, with an optional
//! fragment naming a section of the page.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric page identifier assigned by the page store. `0` means "no such page".
pub type PageId = u32;

/// Characters that can never appear in a title.
const ILLEGAL_TITLE_CHARS: &[char] = &['<', '>', '[', ']', '{', '}', '|'];

/// A namespace index.
///
/// Negative namespaces are virtual: their pages are never stored, so they can
/// neither redirect nor exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(pub i32);

impl Namespace {
    /// Direct links to uploaded media.
    pub const MEDIA: Self = Self(-2);
    /// Generated pages.
    pub const SPECIAL: Self = Self(-1);
    /// Articles.
    pub const MAIN: Self = Self(0);
    /// Article discussion.
    pub const TALK: Self = Self(1);
    /// User pages.
    pub const USER: Self = Self(2);
    /// User discussion.
    pub const USER_TALK: Self = Self(3);
    /// Project pages.
    pub const PROJECT: Self = Self(4);
    /// Project discussion.
    pub const PROJECT_TALK: Self = Self(5);
    /// Uploaded file description pages.
    pub const FILE: Self = Self(6);
    /// File discussion.
    pub const FILE_TALK: Self = Self(7);
    /// Interface messages.
    pub const MEDIAWIKI: Self = Self(8);
    /// Interface message discussion.
    pub const MEDIAWIKI_TALK: Self = Self(9);
    /// Templates.
    pub const TEMPLATE: Self = Self(10);
    /// Template discussion.
    pub const TEMPLATE_TALK: Self = Self(11);
    /// Help pages.
    pub const HELP: Self = Self(12);
    /// Help discussion.
    pub const HELP_TALK: Self = Self(13);
    /// Categories.
    pub const CATEGORY: Self = Self(14);
    /// Category discussion.
    pub const CATEGORY_TALK: Self = Self(15);

    const NAMES: [(Self, &'static str); 17] = [
        (Self::MEDIA, "Media"),
        (Self::SPECIAL, "Special"),
        (Self::TALK, "Talk"),
        (Self::USER, "User"),
        (Self::USER_TALK, "User talk"),
        (Self::PROJECT, "Project"),
        (Self::PROJECT_TALK, "Project talk"),
        (Self::FILE, "File"),
        (Self::FILE_TALK, "File talk"),
        (Self::MEDIAWIKI, "MediaWiki"),
        (Self::MEDIAWIKI_TALK, "MediaWiki talk"),
        (Self::TEMPLATE, "Template"),
        (Self::TEMPLATE_TALK, "Template talk"),
        (Self::HELP, "Help"),
        (Self::HELP_TALK, "Help talk"),
        (Self::CATEGORY, "Category"),
        (Self::CATEGORY_TALK, "Category talk"),
    ];

    /// Older names still accepted on input.
    const ALIASES: [(Self, &'static str); 2] = [(Self::FILE, "Image"), (Self::FILE_TALK, "Image talk")];

    /// Returns true for namespaces whose pages are never stored.
    #[inline]
    #[must_use]
    pub const fn is_virtual(self) -> bool {
        self.0 < 0
    }

    /// Returns the canonical prefix for this namespace, or `None` for the main
    /// namespace and unknown indexes.
    #[must_use]
    pub fn canonical_name(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(ns, _)| *ns == self)
            .map(|(_, name)| *name)
    }

    /// Looks up a namespace by prefix, ignoring case and treating underscores
    /// as spaces.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().replace('_', " ");
        Self::NAMES
            .iter()
            .chain(Self::ALIASES.iter())
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(&wanted))
            .map(|(ns, _)| *ns)
    }

    /// Resolves a settings key, which may be either a namespace index or a
    /// namespace name. The empty string and `"Main"` name the main namespace.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        if let Ok(index) = key.parse::<i32>() {
            return Some(Self(index));
        }
        if key.is_empty() || key.eq_ignore_ascii_case("main") {
            return Some(Self::MAIN);
        }
        Self::from_name(key)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// A page identity: namespace, normalized title text and optional fragment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageTitle {
    namespace: Namespace,
    text: String,
    fragment: Option<String>,
}

impl PageTitle {
    /// Creates a title from already-normalized parts.
    #[must_use]
    pub fn new(namespace: Namespace, text: impl Into<String>) -> Self {
        Self {
            namespace,
            text: text.into(),
            fragment: None,
        }
    }

    /// Parses user-facing title text such as `"User:Some_page#History"`.
    ///
    /// Returns `None` for text that cannot name a page: empty titles,
    /// fragment-only links and titles containing illegal characters.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let input = input.strip_prefix(':').unwrap_or(input);

        let (title_part, fragment) = match input.split_once('#') {
            Some((title, fragment)) => {
                let fragment = fragment.trim();
                (title, (!fragment.is_empty()).then(|| fragment.to_string()))
            }
            None => (input, None),
        };

        // The titles attribute is pipe-delimited.
        if fragment.as_deref().is_some_and(|f| f.contains('|')) {
            return None;
        }

        let title_part = collapse_whitespace(&title_part.replace('_', " "));
        if title_part.is_empty()
            || title_part.contains(ILLEGAL_TITLE_CHARS)
            || title_part.chars().any(char::is_control)
        {
            return None;
        }

        let (namespace, rest) = match title_part.split_once(':') {
            Some((prefix, rest)) => match Namespace::from_name(prefix) {
                Some(namespace) => (namespace, rest.trim()),
                None => (Namespace::MAIN, title_part.as_str()),
            },
            None => (Namespace::MAIN, title_part.as_str()),
        };
        if rest.is_empty() {
            return None;
        }

        let mut chars = rest.chars();
        let text: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => return None,
        };

        Some(Self {
            namespace,
            text,
            fragment,
        })
    }

    /// Returns the namespace.
    #[inline]
    #[must_use]
    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Returns the title text without namespace prefix or fragment.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the fragment, without the leading `#`.
    #[inline]
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Replaces the fragment.
    #[must_use]
    pub fn with_fragment(mut self, fragment: Option<String>) -> Self {
        self.fragment = fragment.filter(|f| !f.is_empty());
        self
    }

    /// Returns this title with the fragment removed.
    #[must_use]
    pub fn without_fragment(&self) -> Self {
        Self {
            namespace: self.namespace,
            text: self.text.clone(),
            fragment: None,
        }
    }

    /// Returns `"Namespace:Text"`, or just the text in the main namespace.
    #[must_use]
    pub fn prefixed_text(&self) -> String {
        match self.namespace.canonical_name() {
            Some(prefix) => format!("{prefix}:{}", self.text),
            None if self.namespace == Namespace::MAIN => self.text.clone(),
            None => format!("{}:{}", self.namespace.0, self.text),
        }
    }

    /// Returns the prefixed text followed by `#fragment` when there is one.
    #[must_use]
    pub fn full_text(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}#{fragment}", self.prefixed_text()),
            None => self.prefixed_text(),
        }
    }

    /// Returns the storage key: title text with spaces as underscores.
    #[must_use]
    pub fn db_key(&self) -> String {
        self.text.replace(' ', "_")
    }

    /// Returns true if both titles name the same page, ignoring fragments.
    #[must_use]
    pub fn same_page(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.text == other.text
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_text())
    }
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_main_namespace() {
        let title = PageTitle::parse("some_page").unwrap();
        assert_eq!(title.namespace(), Namespace::MAIN);
        assert_eq!(title.text(), "Some page");
        assert_eq!(title.prefixed_text(), "Some page");
        assert_eq!(title.db_key(), "Some_page");
    }

    #[test]
    fn test_parse_prefixed_with_fragment() {
        let title = PageTitle::parse("user:alice#Early life").unwrap();
        assert_eq!(title.namespace(), Namespace::USER);
        assert_eq!(title.text(), "Alice");
        assert_eq!(title.fragment(), Some("Early life"));
        assert_eq!(title.full_text(), "User:Alice#Early life");
    }

    #[test]
    fn test_image_alias_maps_to_file() {
        let title = PageTitle::parse("Image:Map.png").unwrap();
        assert_eq!(title.namespace(), Namespace::FILE);
        assert_eq!(title.prefixed_text(), "File:Map.png");
    }

    #[test]
    fn test_unknown_prefix_stays_in_main() {
        let title = PageTitle::parse("Tooltip:Foo").unwrap();
        assert_eq!(title.namespace(), Namespace::MAIN);
        assert_eq!(title.text(), "Tooltip:Foo");
    }

    #[test]
    fn test_unparsable_titles() {
        assert!(PageTitle::parse("").is_none());
        assert!(PageTitle::parse("   ").is_none());
        assert!(PageTitle::parse("#only-a-fragment").is_none());
        assert!(PageTitle::parse("Bad[title]").is_none());
        assert!(PageTitle::parse("Pipe|d").is_none());
        assert!(PageTitle::parse("Category:").is_none());
    }

    #[test]
    fn test_namespace_keys() {
        assert_eq!(Namespace::from_key("0"), Some(Namespace::MAIN));
        assert_eq!(Namespace::from_key("Main"), Some(Namespace::MAIN));
        assert_eq!(Namespace::from_key("user_talk"), Some(Namespace::USER_TALK));
        assert_eq!(Namespace::from_key("14"), Some(Namespace::CATEGORY));
        assert_eq!(Namespace::from_key("Nowhere"), None);
    }

    #[test]
    fn test_same_page_ignores_fragment() {
        let a = PageTitle::parse("Foo#One").unwrap();
        let b = PageTitle::parse("Foo#Two").unwrap();
        assert!(a.same_page(&b));
        assert_ne!(a, b);
    }
}
