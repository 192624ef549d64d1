//! Stage primitives shared by the early pipeline and the late query handler,
//! so both phases reach the same outcome for the same link.

use linktip_shared::{Namespace, PageTitle};

use crate::category::CategoryIndex;
use crate::collaborators::{PageDirectory, TitleDerivationInput, TitleDeriver};
use crate::config::{CategoryFilter, Configuration};
use crate::error::{CoreError, CoreResult};

/// Outcome of title derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DerivedTitle {
    /// The rule produced the empty string (or only whitespace).
    Empty,
    /// A parsable tooltip page title, without fragment.
    Page(PageTitle),
}

/// Follows one redirect hop. Media and virtual namespaces never redirect.
///
/// The link's own fragment wins over the redirect's.
pub fn follow_redirect(pages: &dyn PageDirectory, target: &PageTitle) -> CoreResult<PageTitle> {
    // Media and Special pages are never stored.
    if target.namespace().is_virtual() {
        return Ok(target.clone());
    }
    Ok(match pages.redirect_target(target)? {
        Some(destination) => match target.fragment() {
            Some(fragment) => destination.with_fragment(Some(fragment.to_string())),
            None => destination,
        },
        None => target.clone(),
    })
}

/// Applies the category filter to `target`.
///
/// Targets outside the tooltip-eligible namespaces count as non-members,
/// as do pages that do not exist.
pub fn passes_category_filter(
    cfg: &Configuration,
    filter: &CategoryFilter,
    index: &CategoryIndex<'_>,
    pages: &dyn PageDirectory,
    target: &PageTitle,
) -> CoreResult<bool> {
    let member = if cfg.has_tooltips(target.namespace()) {
        match pages.page_id(target)? {
            Some(id) if id != 0 => index.is_member(id)?,
            _ => false,
        }
    } else {
        false
    };
    Ok(filter.passes(member))
}

/// Runs title derivation.
///
/// # Errors
///
/// Returns [`CoreError::UnparsableTitle`] for a non-empty result that does not
/// parse as a page title, and propagates collaborator failures.
pub fn derive_title(
    titles: &dyn TitleDeriver,
    target: &PageTitle,
    direct: Option<&PageTitle>,
) -> CoreResult<DerivedTitle> {
    let input = TitleDerivationInput {
        target: target.clone(),
        direct: direct.cloned(),
    };
    let text = titles.derive_title(&input)?;
    parse_derived(&text)
}

/// Interprets title text from a derivation rule or a client request.
///
/// # Errors
///
/// Returns [`CoreError::UnparsableTitle`] for unparsable non-empty text.
pub fn parse_derived(text: &str) -> CoreResult<DerivedTitle> {
    if text.trim().is_empty() {
        return Ok(DerivedTitle::Empty);
    }
    PageTitle::parse(text)
        .map(|title| DerivedTitle::Page(title.without_fragment()))
        .ok_or_else(|| CoreError::UnparsableTitle(text.to_string()))
}

/// Returns true if the tooltip page is a file.
#[inline]
#[must_use]
pub fn is_image(title: &PageTitle) -> bool {
    title.namespace() == Namespace::FILE
}
