//! # Linktip
//!
//! Link tooltips for a wiki renderer. Each link's tooltip is resolved in
//! stages: whatever can be decided while the page renders is decided then,
//! and the rest is deferred to a request issued when the reader hovers.
//!
//! ## Crates
//!
//! | Crate            | Side   | Concern                                          |
//! |------------------|--------|--------------------------------------------------|
//! | `linktip_shared` | both   | titles, element ids, annotation and query shapes |
//! | `linktip_core`   | render | configuration, pipeline, category index, queries |
//! | `linktip_client` | client | tooltip state machine and request driver         |
//! | `linktip`        | both   | page rendering glue, in-process transport        |
//!
//! ## Data flow
//!
//! ```text
//! render:  link ─► ResolutionPipeline ─► LinkAnnotation ─► page HTML
//!                                          ClientExport ─► page JSON
//! hover:   TooltipRuntime ─► TooltipQuery ─► TooltipQueryHandler ─► TooltipQueryResponse
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod golden_path;
pub mod page;
pub mod transport;

pub use linktip_client as client;
pub use linktip_core as render;
pub use linktip_shared as shared;

pub use page::{render_page, RenderedPage};
pub use transport::InProcessTransport;
