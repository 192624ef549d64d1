//! # Page Rendering
//!
//! Renders one page through a [`RenderSession`] and keeps what the client
//! runtime needs: the annotated HTML, every annotation in document order
//! and the client export encoded as it would be embedded in the page.

use std::cell::RefCell;

use linktip_core::{
    Configuration, CoreError, CoreResult, LinkHook, LinkSite, RenderSession, Stage, TooltipSource, WikiBackend,
};
use linktip_shared::{ClientExport, LinkAnnotation, PageTitle};
use tracing::debug;

/// A rendered page and its tooltip data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedPage {
    /// Page HTML with annotated links.
    pub html: String,
    /// Annotations in document order. Several links may share an element id.
    pub annotations: Vec<LinkAnnotation>,
    /// Client settings as JSON, `None` when tooltips are off on this page.
    pub export_json: Option<String>,
}

impl RenderedPage {
    /// Decodes the embedded client export.
    ///
    /// # Errors
    ///
    /// Fails if the embedded JSON is malformed.
    pub fn export(&self) -> serde_json::Result<Option<ClientExport>> {
        self.export_json.as_deref().map(ClientExport::from_json).transpose()
    }
}

struct Collecting<'s, 'w, B: WikiBackend> {
    session: &'s RenderSession<'w, B>,
    seen: RefCell<Vec<LinkAnnotation>>,
}

impl<B: WikiBackend> LinkHook for Collecting<'_, '_, B> {
    fn on_link(&self, link: &LinkSite) -> Option<LinkAnnotation> {
        let annotation = self.session.annotate_link(link)?;
        self.seen.borrow_mut().push(annotation.clone());
        Some(annotation)
    }
}

/// Renders `page` with tooltips.
///
/// # Errors
///
/// Propagates renderer failures and export encoding failures. Per-link
/// failures never surface; those links simply get no tooltip.
pub fn render_page<B: WikiBackend>(config: Configuration, backend: &B, page: &PageTitle) -> CoreResult<RenderedPage> {
    let session = RenderSession::new(config, backend, page);
    let hook = Collecting {
        session: &session,
        seen: RefCell::new(Vec::new()),
    };
    let html = backend.render(&TooltipSource::Transclusion(page.without_fragment()), &hook)?;
    let annotations = hook.seen.into_inner();
    let export_json = session
        .client_export()
        .map(|export| export.to_json())
        .transpose()
        .map_err(|error| CoreError::collaborator(Stage::Render, error.to_string()))?;

    debug!(page = %page, links = annotations.len(), "page rendered");
    Ok(RenderedPage {
        html,
        annotations,
        export_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linktip_core::MemoryWiki;

    #[test]
    fn test_collects_annotations_in_order() {
        let mut wiki = MemoryWiki::new();
        wiki.add_page("Tooltip:Foo", "About foo");
        wiki.add_page("Tooltip:Bar", "About bar");
        wiki.add_page("Article", "[[Foo]], [[Bar]], [[Foo#Again]] and [[Help:Contents]]");

        let page = render_page(Configuration::default(), &wiki, &PageTitle::parse("Article").unwrap()).unwrap();
        let ids: Vec<_> = page.annotations.iter().map(|a| a.element_id.as_str()).collect();
        assert_eq!(ids, ["Foo", "Bar", "Foo"]);
        assert!(page.html.contains("data-to-titles=\"Foo#Again||Tooltip:Foo\""), "{}", page.html);
        assert!(page.export().unwrap().is_some());
    }

    #[test]
    fn test_inert_page_has_no_export() {
        let mut wiki = MemoryWiki::new();
        wiki.add_page("Help:Page", "[[Foo]]");
        let page = render_page(Configuration::default(), &wiki, &PageTitle::parse("Help:Page").unwrap()).unwrap();
        assert!(page.annotations.is_empty());
        assert_eq!(page.export_json, None);
    }
}
