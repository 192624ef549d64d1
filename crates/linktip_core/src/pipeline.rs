//! # Resolution Pipeline
//!
//! Runs the early-phase stages for one link and either produces a
//! [`StageResult`] or decides the link gets no tooltip.
//!
//! ## Stage order
//!
//! ```text
//! 1. namespace eligibility     always
//! 2. redirect follow           early_follow              ─► can_late_follow = false
//! 3. category filter           early_category_filtering  ─► can_late_follow = false
//! 4. title derivation          early_title_derivation
//! 5. existence check           early_exists_check (needs a concrete title from 4)
//! ```
//!
//! Any stage may end the run with "no tooltip". Collaborator failures end it
//! the same way; they are logged and never reach the caller.

use linktip_shared::{FallbackKind, PageTitle};
use tracing::debug;

use crate::category::CategoryIndex;
use crate::collaborators::{PageDirectory, TitleDeriver};
use crate::config::Configuration;
use crate::error::CoreResult;
use crate::fallbacks::Fallbacks;
use crate::stages::{self, DerivedTitle};

/// What the early phase learned about one link.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageResult {
    /// The client may still follow the redirect.
    pub can_late_follow: bool,
    /// Link target as written.
    pub direct_target: PageTitle,
    /// Target after redirect follow.
    pub target: PageTitle,
    /// Derived tooltip page title, if derivation ran and was non-empty.
    pub tooltip_title: Option<String>,
    /// The tooltip content needs preloading: a file tooltip page, or a file
    /// fallback when a fallback is shown.
    pub is_image: bool,
    /// The tooltip page is missing; the missing-page fallback applies.
    pub missing_page: bool,
    /// The derived title is empty; the empty-title fallback applies.
    pub empty_title: bool,
}

/// The early phase for one render.
pub struct ResolutionPipeline<'a> {
    config: &'a Configuration,
    index: &'a CategoryIndex<'a>,
    fallbacks: &'a Fallbacks,
    pages: &'a dyn PageDirectory,
    titles: &'a dyn TitleDeriver,
}

impl<'a> ResolutionPipeline<'a> {
    /// Creates a pipeline over the given render state and collaborators.
    #[must_use]
    pub fn new(
        config: &'a Configuration,
        index: &'a CategoryIndex<'a>,
        fallbacks: &'a Fallbacks,
        pages: &'a dyn PageDirectory,
        titles: &'a dyn TitleDeriver,
    ) -> Self {
        Self {
            config,
            index,
            fallbacks,
            pages,
            titles,
        }
    }

    /// Resolves one link. `None` means no tooltip.
    #[must_use]
    pub fn resolve(&self, link: &PageTitle) -> Option<StageResult> {
        match self.try_resolve(link) {
            Ok(result) => result,
            Err(error) => {
                debug!(target = %link, %error, "no tooltip: resolution failed");
                None
            }
        }
    }

    fn try_resolve(&self, link: &PageTitle) -> CoreResult<Option<StageResult>> {
        let cfg = self.config;

        // 1. Namespace eligibility
        if !cfg.enabled || !cfg.has_tooltips(link.namespace()) {
            debug!(target = %link, "no tooltip: namespace not eligible");
            return Ok(None);
        }

        let mut result = StageResult {
            can_late_follow: cfg.late_follow,
            direct_target: link.clone(),
            target: link.clone(),
            tooltip_title: None,
            is_image: false,
            missing_page: false,
            empty_title: false,
        };

        // 2. Redirect follow
        if cfg.early_follow {
            result.target = stages::follow_redirect(self.pages, link)?;
            result.can_late_follow = false;
        }

        // 3. Category filter
        if cfg.early_category_filtering {
            let Some(filter) = cfg.category_filter() else {
                return Ok(None);
            };
            if !stages::passes_category_filter(cfg, &filter, self.index, self.pages, &result.target)? {
                debug!(target = %result.target, "no tooltip: category filter");
                return Ok(None);
            }
            result.can_late_follow = false;
        }

        // 4. Title derivation
        if !cfg.early_title_derivation {
            return Ok(Some(result));
        }
        let direct = (!result.direct_target.same_page(&result.target)).then_some(&result.direct_target);
        let tooltip = match stages::derive_title(self.titles, &result.target, direct)? {
            DerivedTitle::Empty => {
                return Ok(self.with_fallback(result, FallbackKind::EmptyTitle));
            }
            DerivedTitle::Page(tooltip) => tooltip,
        };
        result.tooltip_title = Some(tooltip.prefixed_text());
        result.is_image = stages::is_image(&tooltip);

        // 5. Existence check
        if cfg.early_exists_check && !self.pages.page_exists(&tooltip)? {
            return Ok(self.with_fallback(result, FallbackKind::MissingPage));
        }

        Ok(Some(result))
    }

    fn with_fallback(&self, mut result: StageResult, kind: FallbackKind) -> Option<StageResult> {
        let Some(fallback) = self.fallbacks.get(kind) else {
            debug!(target = %result.target, ?kind, "no tooltip: no fallback");
            return None;
        };
        match kind {
            FallbackKind::EmptyTitle => result.empty_title = true,
            FallbackKind::MissingPage => result.missing_page = true,
            FallbackKind::Loading => {}
        }
        result.is_image = fallback.preload;
        Some(result)
    }
}
