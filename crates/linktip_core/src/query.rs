//! # Tooltip Query Handler
//!
//! The late phase. A hovering client asks for whatever the early phase left
//! open, and the handler answers with the same stage primitives the
//! pipeline uses, so both phases agree on every link.
//!
//! ```text
//! TooltipQuery ─► validate ─► follow? ─► cat? ─► tooltip title ─► title? image?
//!                                                      └─► exists? ─► text?
//! ```
//!
//! Members appear in the response only when requested. An empty derived
//! title is reported as `tooltipTitle: ""` whenever a title was needed.

use linktip_shared::{PageTitle, QueryOption, TextPayload, TooltipQuery, TooltipQueryResponse};
use tracing::debug;

use crate::category::{category_key, CategoryIndex, OnDemandIndex};
use crate::collaborators::{NoTooltips, TooltipSource, WikiBackend};
use crate::config::Configuration;
use crate::error::{CoreError, CoreResult};
use crate::stages::{self, DerivedTitle};

/// Answers late-phase requests.
pub struct TooltipQueryHandler<'w, B: WikiBackend> {
    config: &'w Configuration,
    backend: &'w B,
}

impl<'w, B: WikiBackend> TooltipQueryHandler<'w, B> {
    /// Creates a handler.
    #[must_use]
    pub const fn new(config: &'w Configuration, backend: &'w B) -> Self {
        Self { config, backend }
    }

    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] for malformed requests and
    /// propagates collaborator failures. An unparsable target or tooltip
    /// title is not an error; the affected members are left out.
    pub fn handle(&self, query: &TooltipQuery) -> CoreResult<TooltipQueryResponse> {
        query.validate()?;
        let options = query.options;
        let mut response = TooltipQueryResponse::default();

        let direct = query.target.as_deref().and_then(PageTitle::parse);
        let target = match &direct {
            Some(direct) if options.contains(QueryOption::Follow) => {
                Some(stages::follow_redirect(self.backend, direct)?)
            }
            other => other.clone(),
        };

        if options.contains(QueryOption::Cat) {
            response.passes_category_filter = Some(self.category_verdict(target.as_ref())?);
        }

        let needs_title = [
            QueryOption::Exists,
            QueryOption::Title,
            QueryOption::Image,
            QueryOption::Text,
        ]
        .into_iter()
        .any(|option| options.contains(option));

        let derived = match (&query.tooltip, &target) {
            (Some(text), _) => stages::parse_derived(text),
            (None, Some(target)) if needs_title => {
                let direct = direct.as_ref().filter(|direct| !direct.same_page(target));
                stages::derive_title(self.backend, target, direct)
            }
            (None, _) => return Ok(response),
        };
        let tooltip = match derived {
            Ok(DerivedTitle::Page(tooltip)) => tooltip,
            Ok(DerivedTitle::Empty) => {
                response.tooltip_title = Some(String::new());
                return Ok(response);
            }
            Err(CoreError::UnparsableTitle(text)) => {
                debug!(title = %text, "query: tooltip title does not parse");
                return Ok(response);
            }
            Err(error) => return Err(error),
        };

        if options.contains(QueryOption::Title) {
            response.tooltip_title = Some(tooltip.prefixed_text());
        }
        if options.contains(QueryOption::Image) {
            response.is_image = Some(stages::is_image(&tooltip));
        }
        let exists = if options.contains(QueryOption::Exists) {
            let exists = self.backend.page_exists(&tooltip)?;
            response.exists = Some(exists);
            exists
        } else {
            true
        };
        if exists && options.contains(QueryOption::Text) {
            // Tooltip content never gets tooltips of its own.
            let html = self
                .backend
                .render(&TooltipSource::for_page(tooltip), &NoTooltips)?;
            response.text = Some(TextPayload { html });
        }

        debug!(?query, "query answered");
        Ok(response)
    }

    fn category_verdict(&self, target: Option<&PageTitle>) -> CoreResult<bool> {
        let cfg = self.config;
        let filter = match cfg.category_filter() {
            Some(filter) if cfg.early_category_filtering || cfg.late_category_filtering => filter,
            _ => return Ok(true),
        };
        let (Some(target), Some(key)) = (target, category_key(filter.category())) else {
            return Ok(false);
        };
        let index = CategoryIndex::OnDemand(OnDemandIndex::new(self.backend, key));
        stages::passes_category_filter(cfg, &filter, &index, self.backend, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::MemoryWiki;
    use crate::error::Stage;
    use linktip_shared::{QueryOptions, WireError};

    fn query(target: Option<&str>, tooltip: Option<&str>, options: &str) -> TooltipQuery {
        TooltipQuery {
            target: target.map(str::to_string),
            tooltip: tooltip.map(str::to_string),
            options: QueryOptions::parse(options).unwrap(),
        }
    }

    fn wiki() -> MemoryWiki {
        let mut wiki = MemoryWiki::new();
        wiki.add_page("Tooltip:Foo", "About [[Foo]]");
        wiki.add_page("File:Bar.png", "");
        wiki.add_redirect("Old foo", "Foo");
        wiki.categorize("Foo", "Tooltipped");
        wiki
    }

    #[test]
    fn test_text_and_title() {
        let wiki = wiki();
        let cfg = Configuration::default();
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        let response = handler.handle(&query(Some("Foo"), None, "title|exists|text")).unwrap();
        assert_eq!(response.tooltip_title.as_deref(), Some("Tooltip:Foo"));
        assert_eq!(response.exists, Some(true));
        assert_eq!(response.html(), Some("About <a href=\"Foo\">Foo</a>"));
        assert_eq!(response.is_image, None, "not requested");
        assert_eq!(response.passes_category_filter, None, "not requested");
    }

    #[test]
    fn test_missing_page_has_no_text() {
        let wiki = wiki();
        let cfg = Configuration::default();
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        let response = handler.handle(&query(Some("Nope"), None, "exists|text")).unwrap();
        assert_eq!(response.exists, Some(false));
        assert!(response.text.is_none());
    }

    #[test]
    fn test_follow_before_derivation() {
        let wiki = wiki();
        let cfg = Configuration::default();
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        let followed = handler.handle(&query(Some("Old foo"), None, "follow|title")).unwrap();
        assert_eq!(followed.tooltip_title.as_deref(), Some("Tooltip:Foo"));
        let unfollowed = handler.handle(&query(Some("Old foo"), None, "title")).unwrap();
        assert_eq!(unfollowed.tooltip_title.as_deref(), Some("Tooltip:Old foo"));
    }

    #[test]
    fn test_supplied_tooltip_title() {
        let wiki = wiki();
        let cfg = Configuration::default();
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        let response = handler.handle(&query(None, Some("File:Bar.png"), "image|text")).unwrap();
        assert_eq!(response.is_image, Some(true));
        assert!(response.html().unwrap().starts_with("<img"));
    }

    #[test]
    fn test_empty_title_reported() {
        let wiki = MemoryWiki::new().with_title_template(" ");
        let cfg = Configuration::default();
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        let response = handler.handle(&query(Some("Foo"), None, "exists|text")).unwrap();
        assert_eq!(response.tooltip_title.as_deref(), Some(""));
        assert_eq!(response.exists, None);
    }

    #[test]
    fn test_category_verdicts() {
        let wiki = wiki();
        let mut cfg = Configuration::default();
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        let response = handler.handle(&query(Some("Nope"), None, "cat")).unwrap();
        assert_eq!(response.passes_category_filter, Some(true), "filtering off passes everything");

        cfg.late_category_filtering = true;
        cfg.enabling_category = Some("Tooltipped".into());
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        assert_eq!(
            handler.handle(&query(Some("Foo"), None, "cat")).unwrap().passes_category_filter,
            Some(true)
        );
        assert_eq!(
            handler.handle(&query(Some("Nope"), None, "cat")).unwrap().passes_category_filter,
            Some(false)
        );
        assert_eq!(
            handler.handle(&query(Some("Old foo"), None, "follow|cat")).unwrap().passes_category_filter,
            Some(true)
        );
    }

    #[test]
    fn test_invalid_query() {
        let wiki = wiki();
        let cfg = Configuration::default();
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        assert!(matches!(
            handler.handle(&query(None, Some("Tooltip:Foo"), "cat")),
            Err(CoreError::InvalidQuery(WireError::CategoryWithoutTarget))
        ));
    }

    #[test]
    fn test_collaborator_failure_surfaces() {
        let wiki = MemoryWiki::new().failing(Stage::TitleDerivation);
        let cfg = Configuration::default();
        let handler = TooltipQueryHandler::new(&cfg, &wiki);
        assert!(handler.handle(&query(Some("Foo"), None, "title")).is_err());
    }
}
