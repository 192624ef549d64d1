//! # Linktip Core
//!
//! Render-side tooltip resolution.
//!
//! ## Design Principles
//!
//! 1. **One link never fails the page** - every per-link failure means "no tooltip"
//! 2. **Early and late agree** - the pipeline and the query handler share their stage primitives
//! 3. **Per-render state only** - index, memo, fallbacks and attachment flag live in a session
//! 4. **No flashing** - the loading tooltip is only shown when it cannot immediately vanish
//!
//! ## Example
//!
//! ```rust,ignore
//! use linktip_core::{Configuration, LinkSite, MemoryWiki, RenderSession};
//!
//! let config = Configuration::load("linktip.toml")?;
//! let session = RenderSession::new(config, &wiki, &page);
//!
//! for link in links {
//!     if let Some(annotation) = session.annotate_link(&link) {
//!         // attach annotation.attributes() to the anchor
//!     }
//! }
//! let export = session.client_export();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod annotate;
pub mod attachment;
pub mod category;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod fallbacks;
pub mod negotiate;
pub mod pipeline;
pub mod query;
pub mod session;
pub mod stages;

pub use annotate::LinkAnnotator;
pub use attachment::AttachmentSafety;
pub use category::{CategoryIndex, OnDemandIndex, PrecomputedIndex};
pub use collaborators::{
    CategoryGraph, CategoryMember, ContentRenderer, LinkHook, LinkSite, MemoryWiki, NoTooltips,
    PageDirectory, TitleDerivationInput, TitleDeriver, TooltipSource, WikiBackend,
};
pub use config::{CategoryFilter, Configuration, RawSettings};
pub use error::{CoreError, CoreResult, Stage};
pub use fallbacks::Fallbacks;
pub use negotiate::{needs_two_requests, Negotiation};
pub use pipeline::{ResolutionPipeline, StageResult};
pub use query::TooltipQueryHandler;
pub use session::RenderSession;
