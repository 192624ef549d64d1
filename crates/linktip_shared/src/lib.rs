//! # Linktip Shared Types
//!
//! Types that cross the boundary between the page renderer and the client
//! runtime. Everything here is plain data plus the encodings both sides must
//! agree on byte for byte.
//!
//! ## Boundary
//!
//! ```text
//! RENDER SIDE                                  CLIENT SIDE
//!   |                                              |
//!   |--- LinkAnnotation (id, flags, titles) ------>|
//!   |--- ClientExport (late stages, fallbacks) --->|
//!   |                                              |
//!   |<-- TooltipQuery (target, tooltip, options) --|   on hover
//!   |--- TooltipQueryResponse -------------------->|
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod annotation;
pub mod error;
pub mod escape;
pub mod export;
pub mod query;
pub mod title;

pub use annotation::{LinkAnnotation, LinkTitles, TooltipFlags};
pub use error::{WireError, WireResult};
pub use escape::{decode_element_id, encode_element_id, ElementId};
pub use export::{ClientExport, FallbackContent, FallbackKind, LateStages};
pub use query::{QueryOption, QueryOptions, TextPayload, TooltipQuery, TooltipQueryResponse};
pub use title::{Namespace, PageId, PageTitle};

/// How long a client waits for any single tooltip request before giving up.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;
