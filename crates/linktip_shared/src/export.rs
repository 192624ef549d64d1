//! # Client Export
//!
//! Render-global settings handed to the client once per page: which late
//! stages are still pending, the pre-rendered fallback tooltips and whether
//! hovering must start with a metadata-only check.

use serde::{Deserialize, Serialize};

/// A fallback tooltip rendered at page render time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackContent {
    /// Rendered HTML. May contain `$1`..`$4` placeholders.
    pub html: String,
    /// The content is a file and should be preloaded before it is shown.
    pub preload: bool,
}

/// Which fallback tooltip to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FallbackKind {
    /// Shown while content is loading.
    Loading,
    /// Shown when the tooltip page does not exist.
    MissingPage,
    /// Shown when title derivation produced the empty string.
    EmptyTitle,
}

/// Late stages the client must still run, one flag per stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateStages {
    /// Redirect follow, where the annotation still allows it.
    pub follow: bool,
    /// Category filtering.
    pub category_filter: bool,
    /// Title derivation.
    pub title_derivation: bool,
    /// Existence check.
    pub exists_check: bool,
}

impl LateStages {
    /// Returns true if any stage is pending.
    #[must_use]
    pub const fn any(self) -> bool {
        self.follow || self.category_filter || self.title_derivation || self.exists_check
    }
}

/// Everything the client runtime needs besides per-link annotations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientExport {
    /// Pending late stages.
    pub late: LateStages,
    /// Loading fallback, absent when disabled for this render.
    pub loading: Option<FallbackContent>,
    /// Missing-page fallback.
    pub missing_page: Option<FallbackContent>,
    /// Empty-title fallback.
    pub empty_title: Option<FallbackContent>,
    /// Hover starts with a metadata-only request.
    pub use_two_request_process: bool,
}

impl ClientExport {
    /// Returns the fallback of the given kind.
    #[must_use]
    pub fn fallback(&self, kind: FallbackKind) -> Option<&FallbackContent> {
        match kind {
            FallbackKind::Loading => self.loading.as_ref(),
            FallbackKind::MissingPage => self.missing_page.as_ref(),
            FallbackKind::EmptyTitle => self.empty_title.as_ref(),
        }
    }

    /// Serializes the export as JSON for embedding in the page.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Reads an export embedded in the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the export shape.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_lookup() {
        let export = ClientExport {
            missing_page: Some(FallbackContent {
                html: "No tooltip for $1".into(),
                preload: false,
            }),
            ..ClientExport::default()
        };
        assert!(export.fallback(FallbackKind::Loading).is_none());
        assert_eq!(
            export.fallback(FallbackKind::MissingPage).map(|f| f.html.as_str()),
            Some("No tooltip for $1")
        );
    }

    #[test]
    fn test_json_field_names() {
        let export = ClientExport {
            late: LateStages {
                exists_check: true,
                ..LateStages::default()
            },
            use_two_request_process: true,
            ..ClientExport::default()
        };
        let json = export.to_json().unwrap();
        assert!(json.contains("\"existsCheck\":true"), "{json}");
        assert!(json.contains("\"useTwoRequestProcess\":true"), "{json}");
        assert_eq!(ClientExport::from_json(&json).unwrap(), export);
    }
}
