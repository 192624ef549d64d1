//! # Category Membership Index
//!
//! Answers "is page X in the filter category or one of its subcategories"
//! for the lifetime of one render.
//!
//! ## Strategies
//!
//! ```text
//! Precomputed:  root ─► walk subcategories (visited set) ─► ids ─► sort ─► binary search
//!               O(n) build, O(log n) per lookup
//!
//! OnDemand:     id ─► memo hit? ─► yes: answer
//!                               └► no:  collaborator lookup ─► memo ─► answer
//!               O(1) per repeated lookup
//! ```
//!
//! Both strategies give the same answer for every page in a tooltip-eligible
//! namespace. The precomputed walk tracks visited categories so cyclic
//! category graphs terminate, and refuses trees deeper than
//! [`MAX_CATEGORY_DEPTH`].

use std::collections::{BTreeSet, HashMap, HashSet};

use linktip_shared::{Namespace, PageId, PageTitle};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::collaborators::CategoryGraph;
use crate::config::Configuration;
use crate::error::{CoreError, CoreResult};

/// Deepest subcategory level the precomputed walk descends to.
pub const MAX_CATEGORY_DEPTH: usize = 64;

/// Converts a configured category name (`"Foo bar"` or `"Category:Foo bar"`)
/// into its storage key (`"Foo_bar"`).
#[must_use]
pub fn category_key(name: &str) -> Option<String> {
    let title = PageTitle::parse(name)?;
    if title.namespace() == Namespace::CATEGORY {
        Some(title.db_key())
    } else {
        Some(PageTitle::new(Namespace::CATEGORY, title.prefixed_text()).db_key())
    }
}

/// Sorted member ids collected once per render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrecomputedIndex {
    ids: Vec<PageId>,
}

impl PrecomputedIndex {
    /// Walks the category tree below `root_key`, collecting the ids of member
    /// pages whose namespace is in `eligible`.
    ///
    /// # Errors
    ///
    /// Propagates collaborator failures, and returns
    /// [`CoreError::TraversalTooDeep`] for trees deeper than
    /// [`MAX_CATEGORY_DEPTH`].
    pub fn build(
        graph: &dyn CategoryGraph,
        root_key: &str,
        eligible: &BTreeSet<Namespace>,
    ) -> CoreResult<Self> {
        let mut ids = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<(String, usize)> = vec![(root_key.to_string(), 0)];

        while let Some((key, depth)) = stack.pop() {
            if !visited.insert(key.clone()) {
                continue;
            }
            if depth > MAX_CATEGORY_DEPTH {
                return Err(CoreError::TraversalTooDeep {
                    root: root_key.to_string(),
                    max_depth: MAX_CATEGORY_DEPTH,
                });
            }

            for member in graph.members(&key)? {
                let namespace = member.title.namespace();
                if member.id != 0 && eligible.contains(&namespace) {
                    ids.push(member.id);
                }
                if namespace == Namespace::CATEGORY {
                    stack.push((member.title.db_key(), depth + 1));
                }
            }
        }

        ids.sort_unstable();
        ids.dedup();
        debug!(root = %root_key, members = ids.len(), categories = visited.len(), "category index built");
        Ok(Self { ids })
    }

    /// Builds an index from ids directly.
    #[must_use]
    pub fn from_ids(mut ids: Vec<PageId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// Binary search for `id`.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: PageId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Number of member pages.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no page is a member.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The sorted member ids.
    #[must_use]
    pub fn ids(&self) -> &[PageId] {
        &self.ids
    }
}

/// Lookups through the collaborator, memoized per page id.
pub struct OnDemandIndex<'a> {
    graph: &'a dyn CategoryGraph,
    category_key: String,
    memo: Mutex<HashMap<PageId, bool>>,
}

impl<'a> OnDemandIndex<'a> {
    /// Creates an empty memo for `category_key`.
    #[must_use]
    pub fn new(graph: &'a dyn CategoryGraph, category_key: impl Into<String>) -> Self {
        Self {
            graph,
            category_key: category_key.into(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the memoized answer, asking the collaborator on first use.
    /// Failures are not memoized.
    ///
    /// # Errors
    ///
    /// Propagates collaborator failures.
    pub fn is_member(&self, id: PageId) -> CoreResult<bool> {
        if let Some(&known) = self.memo.lock().get(&id) {
            return Ok(known);
        }
        let member = self.graph.is_transitive_member(id, &self.category_key)?;
        self.memo.lock().insert(id, member);
        Ok(member)
    }

    /// Number of memoized answers.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.memo.lock().len()
    }
}

impl std::fmt::Debug for OnDemandIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnDemandIndex")
            .field("category_key", &self.category_key)
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

/// The membership index for one render.
#[derive(Debug)]
pub enum CategoryIndex<'a> {
    /// Category filtering does not run in this phase.
    Disabled,
    /// Sorted ids, built up front.
    Precomputed(PrecomputedIndex),
    /// Memoized collaborator lookups.
    OnDemand(OnDemandIndex<'a>),
    /// The index could not be built; every lookup fails.
    Unavailable,
}

impl<'a> CategoryIndex<'a> {
    /// Builds the index the early phase needs under `cfg`.
    ///
    /// A failed precomputed build is logged and yields
    /// [`CategoryIndex::Unavailable`], so links that reach the category
    /// stage get no tooltip while the rest of the page renders normally.
    #[must_use]
    pub fn for_render(cfg: &Configuration, graph: &'a dyn CategoryGraph) -> Self {
        if !cfg.enabled || !cfg.early_category_filtering {
            return Self::Disabled;
        }
        let Some(key) = cfg
            .category_filter()
            .and_then(|filter| category_key(filter.category()))
        else {
            warn!("category filter names no usable category; index unavailable");
            return Self::Unavailable;
        };

        if cfg.preprocess_category_filter {
            match PrecomputedIndex::build(graph, &key, &cfg.namespaces_with_tooltips) {
                Ok(index) => Self::Precomputed(index),
                Err(error) => {
                    warn!(%error, category = %key, "cannot build category index");
                    Self::Unavailable
                }
            }
        } else {
            Self::OnDemand(OnDemandIndex::new(graph, key))
        }
    }

    /// Answers membership for page `id`. [`CategoryIndex::Disabled`] answers
    /// `false`.
    ///
    /// # Errors
    ///
    /// Fails for [`CategoryIndex::Unavailable`] and when an on-demand lookup
    /// fails.
    pub fn is_member(&self, id: PageId) -> CoreResult<bool> {
        match self {
            Self::Disabled => Ok(false),
            Self::Precomputed(index) => Ok(index.contains(id)),
            Self::OnDemand(index) => index.is_member(id),
            Self::Unavailable => Err(CoreError::IndexUnavailable),
        }
    }
}
