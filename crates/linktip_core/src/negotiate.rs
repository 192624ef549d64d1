//! # Two-Request Negotiation
//!
//! A loading tooltip must never flash up and then vanish because the late
//! phase decides there is no tooltip after all. When that outcome is
//! possible, hovering first issues a metadata-only check and shows the
//! loading tooltip only once the check passes.
//!
//! ## Decision
//!
//! ```text
//! no loading fallback ────────────────────────────────────────► one request
//! late title  && no missing fallback && no empty fallback ──┐
//! late title  && empty titles possible && no empty fallback ├──► two requests
//! late exists && no missing fallback ───────────────────────┤
//! late category filter ─────────────────────────────────────┘
//!
//! two requests needed but not allowed ──► drop the loading fallback instead
//! ```

use linktip_shared::FallbackKind;
use tracing::debug;

use crate::config::Configuration;
use crate::fallbacks::Fallbacks;

/// Returns true if hovering needs a preliminary check before loading.
#[must_use]
pub fn needs_two_requests(
    cfg: &Configuration,
    loading_fallback: bool,
    missing_page_fallback: bool,
    empty_title_fallback: bool,
) -> bool {
    if !loading_fallback {
        return false;
    }
    let late_title = cfg.late_title_derivation;
    (late_title && !missing_page_fallback && !empty_title_fallback)
        || (late_title && !cfg.assume_nonempty_title && !empty_title_fallback)
        || (cfg.late_exists_check && !missing_page_fallback)
        || cfg.late_category_filtering
}

/// The negotiated client behaviour for one render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Negotiation {
    /// Hover starts with a metadata-only request.
    pub use_two_request_process: bool,
    /// The loading fallback may be shown.
    pub loading_enabled: bool,
}

impl Negotiation {
    /// Negotiates from the rendered fallbacks.
    #[must_use]
    pub fn negotiate(cfg: &Configuration, fallbacks: &Fallbacks) -> Self {
        let loading = fallbacks.has(FallbackKind::Loading);
        let needed = needs_two_requests(
            cfg,
            loading,
            fallbacks.has(FallbackKind::MissingPage),
            fallbacks.has(FallbackKind::EmptyTitle),
        );
        let negotiation = match (needed, cfg.allow_two_request_process) {
            (true, true) => Self {
                use_two_request_process: true,
                loading_enabled: true,
            },
            (true, false) => Self {
                use_two_request_process: false,
                loading_enabled: false,
            },
            (false, _) => Self {
                use_two_request_process: false,
                loading_enabled: loading,
            },
        };
        if needed && !cfg.allow_two_request_process {
            debug!("two-request process not allowed; loading tooltip disabled for this render");
        }
        negotiation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linktip_shared::FallbackContent;

    fn late_only() -> Configuration {
        Configuration::from_toml_str(
            "early_page_title_parse = false\nlate_page_title_parse = true\nlate_exists_check = true\n",
        )
        .unwrap()
    }

    fn fallback() -> Option<FallbackContent> {
        Some(FallbackContent {
            html: "x".into(),
            preload: false,
        })
    }

    #[test]
    fn test_no_loading_fallback_never_needs_two() {
        let mut cfg = late_only();
        cfg.late_category_filtering = true;
        for missing in [false, true] {
            for empty in [false, true] {
                assert!(!needs_two_requests(&cfg, false, missing, empty));
            }
        }
    }

    #[test]
    fn test_late_exists_without_missing_fallback() {
        let cfg = late_only();
        assert!(needs_two_requests(&cfg, true, false, true));
        assert!(!needs_two_requests(&cfg, true, true, true));
    }

    #[test]
    fn test_empty_titles_possible() {
        let mut cfg = late_only();
        cfg.late_exists_check = false;
        assert!(needs_two_requests(&cfg, true, true, false));
        cfg.assume_nonempty_title = true;
        assert!(!needs_two_requests(&cfg, true, true, false));
    }

    #[test]
    fn test_late_category_always_needs_two() {
        let mut cfg = Configuration::default();
        assert!(!needs_two_requests(&cfg, true, true, true));
        cfg.late_category_filtering = true;
        assert!(needs_two_requests(&cfg, true, true, true));
    }

    #[test]
    fn test_disallowed_drops_loading() {
        let mut cfg = late_only();
        cfg.allow_two_request_process = false;
        let fallbacks = Fallbacks {
            loading: fallback(),
            ..Fallbacks::none()
        };
        assert_eq!(
            Negotiation::negotiate(&cfg, &fallbacks),
            Negotiation {
                use_two_request_process: false,
                loading_enabled: false,
            }
        );

        cfg.allow_two_request_process = true;
        assert!(Negotiation::negotiate(&cfg, &fallbacks).use_two_request_process);
    }

    #[test]
    fn test_single_request_keeps_loading() {
        let fallbacks = Fallbacks {
            loading: fallback(),
            missing_page: fallback(),
            empty_title: fallback(),
        };
        let negotiation = Negotiation::negotiate(&late_only(), &fallbacks);
        assert!(!negotiation.use_two_request_process);
        assert!(negotiation.loading_enabled);
    }
}
