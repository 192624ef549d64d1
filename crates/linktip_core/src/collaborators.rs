//! # Collaborator Traits
//!
//! The data access the resolution logic consumes. Page storage, category
//! links, title derivation and content rendering all live outside this
//! crate; the pipeline only sees these traits.
//!
//! ```text
//! linktip_core defines:          host implements:
//! ┌───────────────────┐          ┌───────────────────┐
//! │ trait PageDirectory│ ◄─────── │ impl for its store│
//! └───────────────────┘          └───────────────────┘
//! ```
//!
//! [`MemoryWiki`] implements every trait over in-memory maps. It backs the
//! tests, the benchmarks and the demo binary.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use linktip_shared::{LinkAnnotation, Namespace, PageId, PageTitle};

use crate::category::category_key;
use crate::error::{CoreError, CoreResult, Stage};

// ============================================================================
// TRAITS
// ============================================================================

/// Redirect resolution and page existence.
pub trait PageDirectory {
    /// Returns the redirect destination, or `None` if `title` is not a redirect.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    fn redirect_target(&self, title: &PageTitle) -> CoreResult<Option<PageTitle>>;

    /// Returns true if the page exists.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    fn page_exists(&self, title: &PageTitle) -> CoreResult<bool>;

    /// Returns the page id, or `None` for pages that do not exist.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    fn page_id(&self, title: &PageTitle) -> CoreResult<Option<PageId>>;
}

/// A page directly in a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryMember {
    /// Page id.
    pub id: PageId,
    /// Page title. Members in the Category namespace are subcategories.
    pub title: PageTitle,
}

/// Category links.
pub trait CategoryGraph {
    /// Lists pages directly in the category with storage key `category_key`,
    /// ordered by page id.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    fn members(&self, category_key: &str) -> CoreResult<Vec<CategoryMember>>;

    /// Returns true if page `id` is in the category or any of its subcategories.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    fn is_transitive_member(&self, id: PageId, category_key: &str) -> CoreResult<bool>;
}

/// What title derivation works from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleDerivationInput {
    /// Post-redirect target, with fragment.
    pub target: PageTitle,
    /// Direct target, when a redirect was followed.
    pub direct: Option<PageTitle>,
}

/// Maps a link target to the title of its tooltip page.
pub trait TitleDeriver {
    /// Returns the tooltip title text. The empty string is a valid result and
    /// means "this target has an empty tooltip title".
    ///
    /// # Errors
    ///
    /// Fails if the derivation rule cannot be evaluated.
    fn derive_title(&self, input: &TitleDerivationInput) -> CoreResult<String>;
}

/// How a tooltip page becomes content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TooltipSource {
    /// The page is transcluded.
    Transclusion(PageTitle),
    /// A file page: the image itself is shown.
    Image(PageTitle),
}

impl TooltipSource {
    /// Picks the source kind from the page's namespace.
    #[must_use]
    pub fn for_page(title: PageTitle) -> Self {
        if title.namespace() == Namespace::FILE {
            Self::Image(title)
        } else {
            Self::Transclusion(title)
        }
    }

    /// The tooltip page.
    #[must_use]
    pub const fn title(&self) -> &PageTitle {
        match self {
            Self::Transclusion(title) | Self::Image(title) => title,
        }
    }
}

/// A link met while rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSite {
    /// Link target as written, with fragment.
    pub target: PageTitle,
    /// The link is an image embed.
    pub is_image_link: bool,
}

/// Called for every link found while rendering.
pub trait LinkHook {
    /// Returns the tooltip annotation for the link, if it gets one.
    fn on_link(&self, link: &LinkSite) -> Option<LinkAnnotation>;
}

/// A hook that never annotates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTooltips;

impl LinkHook for NoTooltips {
    fn on_link(&self, _link: &LinkSite) -> Option<LinkAnnotation> {
        None
    }
}

/// Renders tooltip pages to HTML.
pub trait ContentRenderer {
    /// Renders `source`, passing every link it contains through `links`.
    ///
    /// # Errors
    ///
    /// Fails if the page cannot be rendered.
    fn render(&self, source: &TooltipSource, links: &dyn LinkHook) -> CoreResult<String>;
}

/// Everything a render session needs from its host.
pub trait WikiBackend: PageDirectory + CategoryGraph + TitleDeriver + ContentRenderer {}

impl<T: PageDirectory + CategoryGraph + TitleDeriver + ContentRenderer> WikiBackend for T {}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

#[derive(Clone, Debug)]
struct StoredPage {
    id: PageId,
    title: PageTitle,
    content: String,
    redirect: Option<PageTitle>,
    categories: Vec<String>,
}

/// In-memory wiki implementing every collaborator trait.
///
/// Title derivation uses a template in which `$1`/`$2` are the target's
/// prefixed text and fragment and `$3`/`$4` the direct target's (or the
/// target's, when no redirect was followed). Page content may contain
/// `[[Target]]` links, which are rendered as anchors and passed to the
/// [`LinkHook`].
#[derive(Debug)]
pub struct MemoryWiki {
    pages: HashMap<(Namespace, String), StoredPage>,
    next_id: PageId,
    title_template: String,
    failing: HashSet<Stage>,
    membership_lookups: AtomicUsize,
}

impl MemoryWiki {
    /// Creates an empty wiki deriving tooltip titles as `Tooltip:$1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            next_id: 1,
            title_template: "Tooltip:$1".to_string(),
            failing: HashSet::new(),
            membership_lookups: AtomicUsize::new(0),
        }
    }

    /// Replaces the title derivation template.
    #[must_use]
    pub fn with_title_template(mut self, template: impl Into<String>) -> Self {
        self.title_template = template.into();
        self
    }

    /// Makes every collaborator call serving `stage` fail.
    #[must_use]
    pub fn failing(mut self, stage: Stage) -> Self {
        self.failing.insert(stage);
        self
    }

    /// Creates or replaces a page. Returns its id, or `None` for titles that do
    /// not parse or name a virtual namespace.
    pub fn add_page(&mut self, title: &str, content: &str) -> Option<PageId> {
        let title = PageTitle::parse(title)?.without_fragment();
        if title.namespace().is_virtual() {
            return None;
        }
        let key = Self::key(&title);
        if let Some(page) = self.pages.get_mut(&key) {
            page.content = content.to_string();
            page.redirect = None;
            return Some(page.id);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.pages.insert(
            key,
            StoredPage {
                id,
                title,
                content: content.to_string(),
                redirect: None,
                categories: Vec::new(),
            },
        );
        Some(id)
    }

    /// Creates `from` as a redirect to `to`.
    pub fn add_redirect(&mut self, from: &str, to: &str) -> Option<PageId> {
        let destination = PageTitle::parse(to)?;
        let id = self.add_page(from, "")?;
        let key = Self::key(&PageTitle::parse(from)?);
        if let Some(page) = self.pages.get_mut(&key) {
            page.redirect = Some(destination);
        }
        Some(id)
    }

    /// Puts an existing page into a category, creating the page if needed.
    pub fn categorize(&mut self, title: &str, category: &str) -> Option<PageId> {
        let parsed = PageTitle::parse(title)?;
        let key = Self::key(&parsed);
        let id = match self.pages.get(&key) {
            Some(page) => page.id,
            None => self.add_page(title, "")?,
        };
        let category_key = category_key(category)?;
        if let Some(page) = self.pages.get_mut(&key) {
            if !page.categories.contains(&category_key) {
                page.categories.push(category_key);
            }
        }
        Some(id)
    }

    /// Id of the page named `title`, or `0` if there is none.
    #[must_use]
    pub fn page_id_of(&self, title: &str) -> PageId {
        PageTitle::parse(title)
            .and_then(|title| self.page(&title).map(|page| page.id))
            .unwrap_or(0)
    }

    /// Number of transitive membership lookups served so far.
    #[must_use]
    pub fn membership_lookups(&self) -> usize {
        self.membership_lookups.load(Ordering::Relaxed)
    }

    fn key(title: &PageTitle) -> (Namespace, String) {
        (title.namespace(), title.text().to_string())
    }

    fn page(&self, title: &PageTitle) -> Option<&StoredPage> {
        self.pages.get(&Self::key(title))
    }

    fn check(&self, stage: Stage) -> CoreResult<()> {
        if self.failing.contains(&stage) {
            Err(CoreError::collaborator(stage, "injected failure"))
        } else {
            Ok(())
        }
    }

    fn render_links(content: &str, links: &dyn LinkHook) -> String {
        let mut out = String::with_capacity(content.len());
        let mut rest = content;
        while let Some(start) = rest.find("[[") {
            let Some(len) = rest[start + 2..].find("]]") else {
                break;
            };
            out.push_str(&rest[..start]);
            let inner = &rest[start + 2..start + 2 + len];
            match PageTitle::parse(inner) {
                Some(target) => {
                    let site = LinkSite {
                        target: target.clone(),
                        is_image_link: false,
                    };
                    let attributes: String = links
                        .on_link(&site)
                        .map(|annotation| {
                            annotation
                                .attributes()
                                .into_iter()
                                .map(|(name, value)| format!(" {name}=\"{}\"", escape_html(&value)))
                                .collect()
                        })
                        .unwrap_or_default();
                    out.push_str(&format!(
                        "<a href=\"{}\"{attributes}>{}</a>",
                        escape_html(&target.full_text()),
                        escape_html(inner)
                    ));
                }
                None => out.push_str(&rest[start..start + 4 + len]),
            }
            rest = &rest[start + 4 + len..];
        }
        out.push_str(rest);
        out
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl Default for MemoryWiki {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDirectory for MemoryWiki {
    fn redirect_target(&self, title: &PageTitle) -> CoreResult<Option<PageTitle>> {
        self.check(Stage::RedirectFollow)?;
        Ok(self.page(title).and_then(|page| page.redirect.clone()))
    }

    fn page_exists(&self, title: &PageTitle) -> CoreResult<bool> {
        self.check(Stage::ExistenceCheck)?;
        Ok(self.page(title).is_some())
    }

    fn page_id(&self, title: &PageTitle) -> CoreResult<Option<PageId>> {
        self.check(Stage::CategoryFilter)?;
        Ok(self.page(title).map(|page| page.id))
    }
}

impl CategoryGraph for MemoryWiki {
    fn members(&self, category_key: &str) -> CoreResult<Vec<CategoryMember>> {
        self.check(Stage::CategoryFilter)?;
        let mut members: Vec<CategoryMember> = self
            .pages
            .values()
            .filter(|page| page.categories.iter().any(|c| c == category_key))
            .map(|page| CategoryMember {
                id: page.id,
                title: page.title.clone(),
            })
            .collect();
        members.sort_by_key(|member| member.id);
        Ok(members)
    }

    fn is_transitive_member(&self, id: PageId, category_key: &str) -> CoreResult<bool> {
        self.check(Stage::CategoryFilter)?;
        self.membership_lookups.fetch_add(1, Ordering::Relaxed);

        let Some(start) = self.pages.values().find(|page| page.id == id) else {
            return Ok(false);
        };

        // Walk up through parent categories.
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = start.categories.iter().map(String::as_str).collect();
        while let Some(category) = queue.pop_front() {
            if category == category_key {
                return Ok(true);
            }
            if !visited.insert(category) {
                continue;
            }
            let parent = self
                .pages
                .get(&(Namespace::CATEGORY, category.replace('_', " ")));
            if let Some(parent) = parent {
                queue.extend(parent.categories.iter().map(String::as_str));
            }
        }
        Ok(false)
    }
}

impl TitleDeriver for MemoryWiki {
    fn derive_title(&self, input: &TitleDerivationInput) -> CoreResult<String> {
        self.check(Stage::TitleDerivation)?;
        let direct = input.direct.as_ref().unwrap_or(&input.target);
        Ok(self
            .title_template
            .replace("$1", &input.target.prefixed_text())
            .replace("$2", input.target.fragment().unwrap_or_default())
            .replace("$3", &direct.prefixed_text())
            .replace("$4", direct.fragment().unwrap_or_default()))
    }
}

impl ContentRenderer for MemoryWiki {
    fn render(&self, source: &TooltipSource, links: &dyn LinkHook) -> CoreResult<String> {
        self.check(Stage::Render)?;
        match source {
            TooltipSource::Image(title) => Ok(match self.page(title) {
                Some(_) => format!(
                    "<img alt=\"{}\" src=\"/media/{}\">",
                    escape_html(&title.prefixed_text()),
                    escape_html(&title.db_key())
                ),
                None => String::new(),
            }),
            TooltipSource::Transclusion(title) => Ok(self
                .page(title)
                .map(|page| Self::render_links(&page.content, links))
                .unwrap_or_default()),
        }
    }
}
