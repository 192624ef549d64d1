//! # Render Session
//!
//! All tooltip state for rendering one page: the validated configuration,
//! the category index, the rendered fallbacks, the negotiated client mode
//! and the attachment-safety flag. Nothing here outlives the render, and
//! nothing is shared between renders.
//!
//! ## Lifecycle
//!
//! ```text
//! new(config, backend, page)
//!   ├─ page namespace enabled? ── no ──► inert session (no annotations, no export)
//!   ├─ build CategoryIndex
//!   ├─ render fallbacks (attachment suspended)
//!   └─ negotiate two-request process
//! annotate_link(link) × N
//! client_export()
//! ```

use linktip_shared::{ClientExport, LateStages, LinkAnnotation, PageTitle};
use tracing::{debug, info};

use crate::annotate::LinkAnnotator;
use crate::attachment::AttachmentSafety;
use crate::category::CategoryIndex;
use crate::collaborators::{LinkHook, LinkSite, TooltipSource, WikiBackend};
use crate::config::Configuration;
use crate::error::CoreResult;
use crate::fallbacks::Fallbacks;
use crate::negotiate::Negotiation;
use crate::pipeline::ResolutionPipeline;

/// Tooltip state for one page render.
pub struct RenderSession<'w, B: WikiBackend> {
    config: Configuration,
    backend: &'w B,
    active: bool,
    index: CategoryIndex<'w>,
    fallbacks: Fallbacks,
    negotiation: Negotiation,
    attachment: AttachmentSafety,
}

impl<'w, B: WikiBackend> RenderSession<'w, B> {
    /// Prepares a session for rendering `page`.
    pub fn new(config: Configuration, backend: &'w B, page: &PageTitle) -> Self {
        let active = config.enabled_in(page.namespace());
        let index = if active {
            CategoryIndex::for_render(&config, backend)
        } else {
            CategoryIndex::Disabled
        };

        let mut session = Self {
            config,
            backend,
            active,
            index,
            fallbacks: Fallbacks::none(),
            negotiation: Negotiation {
                use_two_request_process: false,
                loading_enabled: false,
            },
            attachment: AttachmentSafety::new(),
        };

        if !active {
            debug!(page = %page, "tooltips not enabled on this page");
            return session;
        }

        let fallbacks = Fallbacks::render(&session.config, session.backend, &session, &session.attachment);
        session.negotiation = Negotiation::negotiate(&session.config, &fallbacks);
        session.fallbacks = fallbacks;

        info!(
            page = %page,
            two_request = session.negotiation.use_two_request_process,
            loading = session.negotiation.loading_enabled,
            "tooltip session ready"
        );
        session
    }

    /// Returns the annotation for one link, or `None` if it gets no tooltip.
    #[must_use]
    pub fn annotate_link(&self, link: &LinkSite) -> Option<LinkAnnotation> {
        if !self.active || !self.attachment.is_allowed() {
            return None;
        }
        if link.is_image_link && !self.config.enable_on_image_links {
            return None;
        }
        self.pipeline()
            .resolve(&link.target)
            .map(|result| LinkAnnotator::annotate(&result))
    }

    /// Renders `page` with every link it contains passed through this session.
    ///
    /// # Errors
    ///
    /// Propagates renderer failures.
    pub fn render_page(&self, page: &PageTitle) -> CoreResult<String> {
        self.backend
            .render(&TooltipSource::Transclusion(page.without_fragment()), self)
    }

    /// Settings the client runtime needs, or `None` for an inert session.
    #[must_use]
    pub fn client_export(&self) -> Option<ClientExport> {
        if !self.active {
            return None;
        }
        let cfg = &self.config;
        Some(ClientExport {
            late: LateStages {
                follow: cfg.late_follow,
                category_filter: cfg.late_category_filtering,
                title_derivation: cfg.late_title_derivation,
                exists_check: cfg.late_exists_check,
            },
            loading: if self.negotiation.loading_enabled {
                self.fallbacks.loading.clone()
            } else {
                None
            },
            missing_page: self.fallbacks.missing_page.clone(),
            empty_title: self.fallbacks.empty_title.clone(),
            use_two_request_process: self.negotiation.use_two_request_process,
        })
    }

    /// The resolution pipeline over this session's state.
    #[must_use]
    pub fn pipeline(&self) -> ResolutionPipeline<'_> {
        ResolutionPipeline::new(&self.config, &self.index, &self.fallbacks, self.backend, self.backend)
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    /// The negotiated client mode.
    #[must_use]
    pub const fn negotiation(&self) -> Negotiation {
        self.negotiation
    }

    /// The rendered fallbacks.
    #[must_use]
    pub const fn fallbacks(&self) -> &Fallbacks {
        &self.fallbacks
    }

    /// False if tooltips are not enabled on this page.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl<B: WikiBackend> LinkHook for RenderSession<'_, B> {
    fn on_link(&self, link: &LinkSite) -> Option<LinkAnnotation> {
        self.annotate_link(link)
    }
}
