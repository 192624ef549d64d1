//! # Wire Error Types
//!
//! Errors raised while decoding anything that crossed the render/client boundary.

use thiserror::Error;

/// Errors decoding annotations, element ids or query requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The flag string was not a permutation of the four flag letters.
    #[error("invalid flag string: {0:?}")]
    InvalidFlags(String),

    /// The titles string did not have exactly three pipe-separated fields.
    #[error("invalid titles string: {0:?}")]
    InvalidTitles(String),

    /// An element id contained a malformed escape or decoded to invalid UTF-8.
    #[error("invalid element id: {0:?}")]
    InvalidElementId(String),

    /// A query option keyword was not recognised.
    #[error("unknown query option: {0:?}")]
    UnknownOption(String),

    /// Neither `target` nor `tooltip` was supplied.
    #[error("a target is required unless a tooltip page is supplied")]
    MissingTarget,

    /// The `cat` option was requested without a `target`.
    #[error("category filtering cannot be done without a target")]
    CategoryWithoutTarget,

    /// No query options were supplied.
    #[error("at least one query option is required")]
    NoOptions,
}

/// Result type for wire decoding.
pub type WireResult<T> = Result<T, WireError>;
