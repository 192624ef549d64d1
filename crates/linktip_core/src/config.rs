//! # Configuration
//!
//! Raw settings are read from TOML, migrated from the legacy enum-style
//! settings, then validated into an immutable [`Configuration`] that is built
//! once per render.
//!
//! ## Normalization order
//!
//! ```text
//! RawSettings ──► defaults ──► legacy migration ──► validation ──► Configuration
//!                              (warn: deprecated)   (warn: forced off)
//! ```
//!
//! Validation never fails: contradictory settings switch the affected feature
//! off, and a configuration with no title-derivation phase disables the whole
//! system for the render.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use linktip_shared::Namespace;
use serde::Deserialize;
use tracing::warn;

use crate::error::CoreResult;

/// Default loading fallback page.
pub const DEFAULT_LOADING_TOOLTIP: &str = "MediaWiki:To-loading-tooltip";
/// Default missing-page fallback page.
pub const DEFAULT_MISSING_PAGE_TOOLTIP: &str = "MediaWiki:To-missing-page-tooltip";
/// Default empty-title fallback page.
pub const DEFAULT_EMPTY_TITLE_TOOLTIP: &str = "MediaWiki:To-empty-page-name-tooltip";

/// A legacy setting value: a symbolic name, an integer or a boolean.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LegacyValue {
    /// `TO_DISABLE`, `TO_RUN_EARLY`, ...
    Name(String),
    /// The numeric form, `0..=3`.
    Int(i64),
    /// `true` = enabling, `false` = disabling.
    Bool(bool),
}

/// When a legacy setting ran its stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LegacyPhase {
    Disable,
    Prequery,
    RunEarly,
    RunLate,
}

impl LegacyValue {
    fn phase(&self) -> Option<LegacyPhase> {
        match self {
            Self::Name(name) => match name.as_str() {
                "TO_DISABLE" => Some(LegacyPhase::Disable),
                "TO_PREQUERY" => Some(LegacyPhase::Prequery),
                "TO_RUN_EARLY" => Some(LegacyPhase::RunEarly),
                "TO_RUN_LATE" => Some(LegacyPhase::RunLate),
                _ => None,
            },
            Self::Int(0) => Some(LegacyPhase::Disable),
            Self::Int(1) => Some(LegacyPhase::Prequery),
            Self::Int(2) => Some(LegacyPhase::RunEarly),
            Self::Int(3) => Some(LegacyPhase::RunLate),
            Self::Int(_) | Self::Bool(_) => None,
        }
    }

    /// `Some(true)` for enabling mode, `Some(false)` for disabling mode.
    fn filter_mode(&self) -> Option<bool> {
        match self {
            Self::Name(name) if name == "TO_ENABLING" => Some(true),
            Self::Name(name) if name == "TO_DISABLING" => Some(false),
            Self::Bool(enabling) => Some(*enabling),
            _ => None,
        }
    }
}

/// Settings as written in the settings file. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    /// Page namespaces (name or index) in which links get tooltips.
    pub enable_in_namespaces: Option<BTreeMap<String, bool>>,
    /// Target namespaces whose pages have tooltips.
    pub namespaces_with_tooltips: Option<BTreeMap<String, bool>>,
    /// Build the category index up front instead of on demand.
    pub preprocess_category_filter: Option<bool>,
    /// Attach tooltips to image links too.
    pub enable_on_image_links: Option<bool>,
    /// Follow target redirects at render time.
    pub early_target_redirect_follow: Option<bool>,
    /// Follow target redirects on hover.
    pub late_target_redirect_follow: Option<bool>,
    /// Apply the category filter at render time.
    pub early_category_filtering: Option<bool>,
    /// Apply the category filter on hover.
    pub late_category_filtering: Option<bool>,
    /// Category whose members get tooltips.
    pub enabling_category: Option<String>,
    /// Category whose members get no tooltips.
    pub disabling_category: Option<String>,
    /// Derive tooltip titles at render time.
    pub early_page_title_parse: Option<bool>,
    /// Derive tooltip titles on hover.
    pub late_page_title_parse: Option<bool>,
    /// Title derivation never yields the empty string.
    pub assume_nonempty_page_title: Option<bool>,
    /// Check tooltip page existence at render time.
    pub early_exists_check: Option<bool>,
    /// Check tooltip page existence on hover.
    pub late_exists_check: Option<bool>,
    /// Loading fallback page.
    pub loading_tooltip: Option<String>,
    /// Missing-page fallback page.
    pub missing_page_tooltip: Option<String>,
    /// Empty-title fallback page.
    pub empty_page_name_tooltip: Option<String>,
    /// Allow a metadata-only request before the content request.
    pub allow_two_request_process: Option<bool>,

    /// Deprecated: redirect follow phase.
    pub follow_target_redirects: Option<LegacyValue>,
    /// Deprecated: category filtering phase.
    pub category_filtering: Option<LegacyValue>,
    /// Deprecated: enabling or disabling filter mode.
    pub category_filter_mode: Option<LegacyValue>,
    /// Deprecated: title derivation phase.
    pub page_title_parse: Option<LegacyValue>,
    /// Deprecated: existence check phase.
    pub exists_check: Option<LegacyValue>,
}

/// Category filter mode and its root category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Only members of the category get tooltips.
    Enabling(String),
    /// Members of the category get no tooltips.
    Disabling(String),
}

impl CategoryFilter {
    /// Root category name.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::Enabling(name) | Self::Disabling(name) => name,
        }
    }

    /// Combines membership with the mode.
    #[inline]
    #[must_use]
    pub const fn passes(&self, is_member: bool) -> bool {
        match self {
            Self::Enabling(_) => is_member,
            Self::Disabling(_) => !is_member,
        }
    }
}

/// Validated settings for one render. Read-only once built.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    /// False when no title-derivation phase is enabled.
    pub enabled: bool,
    /// Page namespaces in which links get tooltips.
    pub enable_in_namespaces: BTreeSet<Namespace>,
    /// Target namespaces whose pages have tooltips.
    pub namespaces_with_tooltips: BTreeSet<Namespace>,
    /// Use the precomputed category index.
    pub preprocess_category_filter: bool,
    /// Attach tooltips to image links.
    pub enable_on_image_links: bool,
    /// Follow redirects at render time.
    pub early_follow: bool,
    /// Follow redirects on hover.
    pub late_follow: bool,
    /// Category filter at render time.
    pub early_category_filtering: bool,
    /// Category filter on hover.
    pub late_category_filtering: bool,
    /// Enabling category, if any.
    pub enabling_category: Option<String>,
    /// Disabling category, if any.
    pub disabling_category: Option<String>,
    /// Title derivation at render time.
    pub early_title_derivation: bool,
    /// Title derivation on hover.
    pub late_title_derivation: bool,
    /// Title derivation never yields the empty string.
    pub assume_nonempty_title: bool,
    /// Existence check at render time.
    pub early_exists_check: bool,
    /// Existence check on hover.
    pub late_exists_check: bool,
    /// Loading fallback page.
    pub loading_tooltip: Option<String>,
    /// Missing-page fallback page.
    pub missing_page_tooltip: Option<String>,
    /// Empty-title fallback page.
    pub empty_title_tooltip: Option<String>,
    /// Allow the two-request process.
    pub allow_two_request_process: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from_settings(RawSettings::default())
    }
}

impl Configuration {
    /// Normalizes raw settings. Never fails; problems are logged and the
    /// affected features switched off.
    #[must_use]
    pub fn from_settings(raw: RawSettings) -> Self {
        let mut cfg = Self::defaults_merged(&raw);
        cfg.migrate_legacy(&raw);
        cfg.validate();
        cfg
    }

    /// Parses and normalizes TOML settings.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`](crate::CoreError::Config) if the text is
    /// not valid settings TOML.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let raw: RawSettings = toml::from_str(text)?;
        Ok(Self::from_settings(raw))
    }

    /// Reads, parses and normalizes a settings file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Returns the active category filter, preferring the enabling category.
    #[must_use]
    pub fn category_filter(&self) -> Option<CategoryFilter> {
        self.enabling_category
            .clone()
            .map(CategoryFilter::Enabling)
            .or_else(|| self.disabling_category.clone().map(CategoryFilter::Disabling))
    }

    /// Returns true if tooltips are attached on pages in `namespace`.
    #[inline]
    #[must_use]
    pub fn enabled_in(&self, namespace: Namespace) -> bool {
        self.enabled && self.enable_in_namespaces.contains(&namespace)
    }

    /// Returns true if links into `namespace` may get tooltips.
    #[inline]
    #[must_use]
    pub fn has_tooltips(&self, namespace: Namespace) -> bool {
        self.namespaces_with_tooltips.contains(&namespace)
    }

    fn defaults_merged(raw: &RawSettings) -> Self {
        let enable_in_namespaces = namespace_set(
            &[
                Namespace::MAIN,
                Namespace::USER,
                Namespace::PROJECT,
                Namespace::CATEGORY,
            ],
            raw.enable_in_namespaces.as_ref(),
        );
        let namespaces_with_tooltips = namespace_set(
            &[Namespace::MAIN, Namespace::USER],
            raw.namespaces_with_tooltips.as_ref(),
        );

        Self {
            enabled: true,
            enable_in_namespaces,
            namespaces_with_tooltips,
            preprocess_category_filter: raw.preprocess_category_filter.unwrap_or(false),
            enable_on_image_links: raw.enable_on_image_links.unwrap_or(false),
            early_follow: raw.early_target_redirect_follow.unwrap_or(true),
            late_follow: raw.late_target_redirect_follow.unwrap_or(true),
            early_category_filtering: raw.early_category_filtering.unwrap_or(false),
            late_category_filtering: raw.late_category_filtering.unwrap_or(false),
            enabling_category: raw.enabling_category.clone(),
            disabling_category: raw.disabling_category.clone(),
            early_title_derivation: raw.early_page_title_parse.unwrap_or(true),
            late_title_derivation: raw.late_page_title_parse.unwrap_or(false),
            assume_nonempty_title: raw.assume_nonempty_page_title.unwrap_or(false),
            early_exists_check: raw.early_exists_check.unwrap_or(true),
            late_exists_check: raw.late_exists_check.unwrap_or(false),
            loading_tooltip: Some(
                raw.loading_tooltip
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOADING_TOOLTIP.to_string()),
            ),
            missing_page_tooltip: Some(
                raw.missing_page_tooltip
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MISSING_PAGE_TOOLTIP.to_string()),
            ),
            empty_title_tooltip: Some(
                raw.empty_page_name_tooltip
                    .clone()
                    .unwrap_or_else(|| DEFAULT_EMPTY_TITLE_TOOLTIP.to_string()),
            ),
            allow_two_request_process: raw.allow_two_request_process.unwrap_or(true),
        }
    }

    fn migrate_legacy(&mut self, raw: &RawSettings) {
        if let Some(value) = &raw.follow_target_redirects {
            match value.phase() {
                Some(phase) => {
                    self.early_follow = phase == LegacyPhase::RunEarly;
                    self.late_follow = phase != LegacyPhase::Disable;
                    warn!(
                        early = self.early_follow,
                        late = self.late_follow,
                        "follow_target_redirects is deprecated; applied early/late_target_redirect_follow"
                    );
                }
                None => warn!(?value, "ignoring unrecognised follow_target_redirects"),
            }
        }

        if let Some(value) = &raw.category_filtering {
            match value.phase() {
                Some(phase) => {
                    self.early_category_filtering =
                        matches!(phase, LegacyPhase::Prequery | LegacyPhase::RunEarly);
                    self.preprocess_category_filter = phase == LegacyPhase::Prequery;
                    self.late_category_filtering = phase == LegacyPhase::RunLate;
                    warn!(
                        early = self.early_category_filtering,
                        preprocess = self.preprocess_category_filter,
                        late = self.late_category_filtering,
                        "category_filtering is deprecated; applied early/late_category_filtering"
                    );
                }
                None => warn!(?value, "ignoring unrecognised category_filtering"),
            }
        }

        if let Some(value) = &raw.category_filter_mode {
            match value.filter_mode() {
                Some(true) => {
                    self.disabling_category = None;
                    warn!("category_filter_mode is deprecated; disabling_category cleared");
                }
                Some(false) => {
                    self.enabling_category = None;
                    warn!("category_filter_mode is deprecated; enabling_category cleared");
                }
                None => warn!(?value, "ignoring unrecognised category_filter_mode"),
            }
        }

        if let Some(value) = &raw.page_title_parse {
            match value.phase() {
                Some(phase) => {
                    self.early_title_derivation = phase == LegacyPhase::RunEarly;
                    self.late_title_derivation = !self.early_title_derivation;
                    warn!(
                        early = self.early_title_derivation,
                        late = self.late_title_derivation,
                        "page_title_parse is deprecated; applied early/late_page_title_parse"
                    );
                }
                None => warn!(?value, "ignoring unrecognised page_title_parse"),
            }
        }

        if let Some(value) = &raw.exists_check {
            match value.phase() {
                Some(phase) => {
                    self.early_exists_check = phase == LegacyPhase::RunEarly;
                    self.late_exists_check = phase == LegacyPhase::RunLate;
                    warn!(
                        early = self.early_exists_check,
                        late = self.late_exists_check,
                        "exists_check is deprecated; applied early/late_exists_check"
                    );
                }
                None => warn!(?value, "ignoring unrecognised exists_check"),
            }
        }
    }

    fn validate(&mut self) {
        for name in [
            &mut self.enabling_category,
            &mut self.disabling_category,
            &mut self.loading_tooltip,
            &mut self.missing_page_tooltip,
            &mut self.empty_title_tooltip,
        ] {
            if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
                *name = None;
            }
        }

        if (self.early_category_filtering || self.late_category_filtering)
            && self.enabling_category.is_none()
            && self.disabling_category.is_none()
        {
            self.early_category_filtering = false;
            self.late_category_filtering = false;
            warn!("category filtering needs an enabling or disabling category; forced off");
        }

        if !(self.early_title_derivation || self.late_title_derivation) {
            self.enabled = false;
            warn!("no title derivation phase is enabled; tooltips are disabled");
        }

        if !self.early_title_derivation && self.early_exists_check {
            self.early_exists_check = false;
            warn!("early existence check needs early title derivation; forced off");
        }

        // Late stages only fill in what the early phase left undone.
        self.late_follow &= !self.early_follow;
        self.late_category_filtering &= !self.early_category_filtering;
        self.late_title_derivation &= !self.early_title_derivation;
        self.late_exists_check &= !self.early_exists_check;
    }
}

fn namespace_set(defaults: &[Namespace], overrides: Option<&BTreeMap<String, bool>>) -> BTreeSet<Namespace> {
    let mut set: BTreeSet<Namespace> = defaults.iter().copied().collect();
    for (key, enabled) in overrides.into_iter().flatten() {
        match Namespace::from_key(key) {
            Some(namespace) if *enabled => {
                set.insert(namespace);
            }
            Some(namespace) => {
                set.remove(&namespace);
            }
            None => warn!(key = %key, "ignoring unknown namespace in settings"),
        }
    }
    set
}
