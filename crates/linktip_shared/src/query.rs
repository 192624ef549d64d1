//! # Tooltip Query Wire Shapes
//!
//! Request and response of the late-phase query endpoint. Responses carry
//! booleans as the strings `"true"`/`"false"` and content as `{"*": html}`.

use crate::error::{WireError, WireResult};
use serde::{Deserialize, Serialize};

/// One piece of information a client may ask the endpoint for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryOption {
    /// Resolve the target's redirect before deriving the tooltip title.
    Follow,
    /// Report whether the tooltip page exists.
    Exists,
    /// Report the tooltip page title.
    Title,
    /// Report whether the tooltip page is a file.
    Image,
    /// Report whether the target passes the category filter.
    Cat,
    /// Return the rendered tooltip content.
    Text,
}

impl QueryOption {
    /// Every option, in wire order.
    pub const ALL: [Self; 6] = [
        Self::Follow,
        Self::Exists,
        Self::Title,
        Self::Image,
        Self::Cat,
        Self::Text,
    ];

    /// Returns the wire keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Exists => "exists",
            Self::Title => "title",
            Self::Image => "image",
            Self::Cat => "cat",
            Self::Text => "text",
        }
    }

    /// Parses a wire keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.keyword() == keyword)
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of [`QueryOption`]s, written on the wire as `exists|title|text`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueryOptions(u8);

impl QueryOptions {
    /// The empty set.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a copy with `option` added.
    #[inline]
    #[must_use]
    pub const fn with(self, option: QueryOption) -> Self {
        Self(self.0 | option.bit())
    }

    /// Adds an option.
    #[inline]
    pub fn insert(&mut self, option: QueryOption) {
        self.0 |= option.bit();
    }

    /// Returns true if `option` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, option: QueryOption) -> bool {
        self.0 & option.bit() != 0
    }

    /// Returns true if the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the options in wire order.
    pub fn iter(self) -> impl Iterator<Item = QueryOption> {
        QueryOption::ALL.into_iter().filter(move |o| self.contains(*o))
    }

    /// Parses a pipe-separated keyword list. Empty segments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownOption`] for an unrecognised keyword.
    pub fn parse(input: &str) -> WireResult<Self> {
        input
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| QueryOption::from_keyword(s).ok_or_else(|| WireError::UnknownOption(s.to_string())))
            .collect()
    }
}

impl FromIterator<QueryOption> for QueryOptions {
    fn from_iter<T: IntoIterator<Item = QueryOption>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl TryFrom<String> for QueryOptions {
    type Error = WireError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QueryOptions> for String {
    fn from(options: QueryOptions) -> Self {
        options.iter().map(QueryOption::keyword).collect::<Vec<_>>().join("|")
    }
}

/// A late-phase request from the client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipQuery {
    /// Title of the page the link points to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Title of the tooltip page, when the client already knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// What the client wants back.
    pub options: QueryOptions,
}

impl TooltipQuery {
    /// Checks the request shape.
    ///
    /// # Errors
    ///
    /// Fails when no option is given, when neither target nor tooltip is
    /// supplied, or when `cat` is requested without a target.
    pub fn validate(&self) -> WireResult<()> {
        if self.options.is_empty() {
            return Err(WireError::NoOptions);
        }
        if self.target.is_none() && self.tooltip.is_none() {
            return Err(WireError::MissingTarget);
        }
        if self.options.contains(QueryOption::Cat) && self.target.is_none() {
            return Err(WireError::CategoryWithoutTarget);
        }
        Ok(())
    }
}

/// Rendered content, serialized as `{"*": "<html>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPayload {
    /// The rendered HTML.
    #[serde(rename = "*")]
    pub html: String,
}

/// The endpoint's answer. Members appear only when requested and resolvable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipQueryResponse {
    /// Category filter verdict for the target.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "wire_bool")]
    pub passes_category_filter: Option<bool>,
    /// Derived tooltip page title. `Some("")` means the derivation was empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip_title: Option<String>,
    /// Whether the tooltip page is a file.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "wire_bool")]
    pub is_image: Option<bool>,
    /// Whether the tooltip page exists.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "wire_bool")]
    pub exists: Option<bool>,
    /// Rendered tooltip content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextPayload>,
}

impl TooltipQueryResponse {
    /// Returns the rendered HTML, if any.
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.html.as_str())
    }
}

/// `"true"`/`"false"` strings. Anything but `"false"` reads as true.
mod wire_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(true) => serializer.serialize_str("true"),
            Some(false) => serializer.serialize_str("false"),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.map(|s| s != "false"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_parse_and_display() {
        let options = QueryOptions::parse("text|exists||title").unwrap();
        assert!(options.contains(QueryOption::Exists));
        assert!(options.contains(QueryOption::Text));
        assert!(!options.contains(QueryOption::Cat));
        assert_eq!(String::from(options), "exists|title|text");
    }

    #[test]
    fn test_unknown_option_rejected() {
        assert_eq!(
            QueryOptions::parse("exists|colour"),
            Err(WireError::UnknownOption("colour".into()))
        );
    }

    #[test]
    fn test_validate() {
        let cat = QueryOptions::empty().with(QueryOption::Cat);
        let query = TooltipQuery {
            target: None,
            tooltip: Some("Tooltip:Foo".into()),
            options: cat,
        };
        assert_eq!(query.validate(), Err(WireError::CategoryWithoutTarget));

        let query = TooltipQuery {
            target: None,
            tooltip: None,
            options: QueryOptions::empty().with(QueryOption::Text),
        };
        assert_eq!(query.validate(), Err(WireError::MissingTarget));

        let query = TooltipQuery {
            target: Some("Foo".into()),
            tooltip: None,
            options: QueryOptions::empty(),
        };
        assert_eq!(query.validate(), Err(WireError::NoOptions));
    }

    #[test]
    fn test_response_json_shape() {
        let response = TooltipQueryResponse {
            passes_category_filter: Some(false),
            tooltip_title: Some("Tooltip:Foo".into()),
            is_image: None,
            exists: Some(true),
            text: Some(TextPayload { html: "<p>hi</p>".into() }),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "passesCategoryFilter": "false",
                "tooltipTitle": "Tooltip:Foo",
                "exists": "true",
                "text": {"*": "<p>hi</p>"}
            })
        );
        let back: TooltipQueryResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn test_query_json_options_string() {
        let query: TooltipQuery =
            serde_json::from_str(r#"{"target":"Foo","options":"cat|text"}"#).unwrap();
        assert!(query.options.contains(QueryOption::Cat));
        assert!(query.validate().is_ok());
        assert!(serde_json::from_str::<TooltipQuery>(r#"{"target":"Foo","options":"nope"}"#).is_err());
    }
}
