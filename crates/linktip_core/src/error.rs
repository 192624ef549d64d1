//! # Core Error Types
//!
//! Errors raised on the render side. Per-link errors are absorbed by the
//! pipeline and session and become "no tooltip"; only the query endpoint and
//! settings loading hand errors to their callers.

use linktip_shared::WireError;
use thiserror::Error;

/// The stage a collaborator was serving when it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Redirect resolution.
    RedirectFollow,
    /// Category membership lookup.
    CategoryFilter,
    /// Tooltip title derivation.
    TitleDerivation,
    /// Page existence lookup.
    ExistenceCheck,
    /// Content rendering.
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RedirectFollow => "redirect follow",
            Self::CategoryFilter => "category filter",
            Self::TitleDerivation => "title derivation",
            Self::ExistenceCheck => "existence check",
            Self::Render => "render",
        };
        f.write_str(name)
    }
}

/// Errors that can occur on the render side.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A data-access collaborator failed.
    #[error("{stage} failed: {reason}")]
    Collaborator {
        /// Stage being served.
        stage: Stage,
        /// Collaborator's description of the failure.
        reason: String,
    },

    /// Text could not be parsed as a page title.
    #[error("unparsable title: {0:?}")]
    UnparsableTitle(String),

    /// A query request was malformed.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] WireError),

    /// A settings file could not be parsed.
    #[error("invalid settings: {0}")]
    Config(#[from] toml::de::Error),

    /// A settings file could not be read.
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),

    /// The category graph is deeper than the traversal allows.
    #[error("category tree deeper than {max_depth} levels below {root}")]
    TraversalTooDeep {
        /// Root category key.
        root: String,
        /// Depth limit that was hit.
        max_depth: usize,
    },

    /// The category index could not be built for this render.
    #[error("category index unavailable")]
    IndexUnavailable,
}

impl CoreError {
    /// Shorthand for a collaborator failure.
    pub fn collaborator(stage: Stage, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            stage,
            reason: reason.into(),
        }
    }
}

/// Result type for render-side operations.
pub type CoreResult<T> = Result<T, CoreError>;
