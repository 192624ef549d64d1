//! # Fallback Tooltips
//!
//! The loading, missing-page and empty-title tooltips are rendered once per
//! render session, with attachment suspended. A fallback whose page renders
//! to whitespace is treated as not configured.

use linktip_shared::{FallbackContent, FallbackKind, Namespace, PageTitle};
use tracing::warn;

use crate::attachment::AttachmentSafety;
use crate::collaborators::{ContentRenderer, LinkHook, TooltipSource};
use crate::config::Configuration;

/// Rendered fallbacks for one render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fallbacks {
    /// Shown while content loads.
    pub loading: Option<FallbackContent>,
    /// Shown for missing tooltip pages.
    pub missing_page: Option<FallbackContent>,
    /// Shown when the derived title is empty.
    pub empty_title: Option<FallbackContent>,
}

impl Fallbacks {
    /// No fallbacks at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Renders every configured fallback page.
    pub fn render(
        cfg: &Configuration,
        renderer: &dyn ContentRenderer,
        links: &dyn LinkHook,
        attachment: &AttachmentSafety,
    ) -> Self {
        let render = |name: Option<&str>| render_one(name, renderer, links, attachment);
        Self {
            loading: render(cfg.loading_tooltip.as_deref()),
            missing_page: render(cfg.missing_page_tooltip.as_deref()),
            empty_title: if cfg.assume_nonempty_title {
                None
            } else {
                render(cfg.empty_title_tooltip.as_deref())
            },
        }
    }

    /// Returns the fallback of the given kind.
    #[must_use]
    pub fn get(&self, kind: FallbackKind) -> Option<&FallbackContent> {
        match kind {
            FallbackKind::Loading => self.loading.as_ref(),
            FallbackKind::MissingPage => self.missing_page.as_ref(),
            FallbackKind::EmptyTitle => self.empty_title.as_ref(),
        }
    }

    /// Returns true if the fallback of the given kind is available.
    #[inline]
    #[must_use]
    pub fn has(&self, kind: FallbackKind) -> bool {
        self.get(kind).is_some()
    }
}

fn render_one(
    name: Option<&str>,
    renderer: &dyn ContentRenderer,
    links: &dyn LinkHook,
    attachment: &AttachmentSafety,
) -> Option<FallbackContent> {
    let name = name?;
    let Some(title) = PageTitle::parse(name) else {
        warn!(page = %name, "fallback tooltip page name does not parse");
        return None;
    };
    let title = title.without_fragment();
    let preload = title.namespace() == Namespace::FILE;

    let rendered = {
        let _suspended = attachment.suspend();
        renderer.render(&TooltipSource::for_page(title), links)
    };
    match rendered {
        Ok(html) if !html.trim().is_empty() => Some(FallbackContent { html, preload }),
        Ok(_) => None,
        Err(error) => {
            warn!(page = %name, %error, "cannot render fallback tooltip");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MemoryWiki, NoTooltips};
    use crate::error::Stage;

    #[test]
    fn test_whitespace_fallback_is_unavailable() {
        let mut wiki = MemoryWiki::new();
        wiki.add_page("MediaWiki:To-loading-tooltip", "Loading $1...");
        wiki.add_page("MediaWiki:To-missing-page-tooltip", "   \n");
        let fallbacks = Fallbacks::render(
            &Configuration::default(),
            &wiki,
            &NoTooltips,
            &AttachmentSafety::new(),
        );
        assert_eq!(fallbacks.loading.as_ref().map(|f| f.html.as_str()), Some("Loading $1..."));
        assert!(!fallbacks.has(FallbackKind::MissingPage));
        assert!(!fallbacks.has(FallbackKind::EmptyTitle), "page does not exist");
    }

    #[test]
    fn test_file_fallback_is_preloaded() {
        let mut wiki = MemoryWiki::new();
        wiki.add_page("File:Spinner.gif", "");
        let mut cfg = Configuration::default();
        cfg.loading_tooltip = Some("File:Spinner.gif".into());
        let fallbacks = Fallbacks::render(&cfg, &wiki, &NoTooltips, &AttachmentSafety::new());
        assert!(fallbacks.loading.unwrap().preload);
    }

    #[test]
    fn test_assume_nonempty_drops_empty_title_fallback() {
        let mut wiki = MemoryWiki::new();
        wiki.add_page("MediaWiki:To-empty-page-name-tooltip", "No title");
        let mut cfg = Configuration::default();
        cfg.assume_nonempty_title = true;
        let fallbacks = Fallbacks::render(&cfg, &wiki, &NoTooltips, &AttachmentSafety::new());
        assert!(fallbacks.empty_title.is_none());
    }

    #[test]
    fn test_render_failure_is_unavailable() {
        let wiki = MemoryWiki::new().failing(Stage::Render);
        let fallbacks = Fallbacks::render(
            &Configuration::default(),
            &wiki,
            &NoTooltips,
            &AttachmentSafety::new(),
        );
        assert_eq!(fallbacks, Fallbacks::none());
    }
}
