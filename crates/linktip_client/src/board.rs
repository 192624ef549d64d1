//! The one tooltip currently on screen.
//!
//! Leaving a link clears the board only if the board still names that link,
//! so a slow response for a link the pointer already left cannot hide the
//! tooltip of the link it moved to.

use std::sync::Arc;

use linktip_shared::ElementId;
use parking_lot::Mutex;

/// Shared handle to the visible tooltip id.
#[derive(Clone, Debug, Default)]
pub struct VisibleTooltip {
    current: Arc<Mutex<Option<ElementId>>>,
}

impl VisibleTooltip {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `id` the visible tooltip. Returns the previously visible id if
    /// it was a different one, so the caller can hide it.
    pub fn show(&self, id: &ElementId) -> Option<ElementId> {
        let mut current = self.current.lock();
        match current.replace(id.clone()) {
            Some(previous) if previous != *id => Some(previous),
            _ => None,
        }
    }

    /// Clears the board if it still names `id`. Returns true if it did.
    pub fn clear_if(&self, id: &ElementId) -> bool {
        let mut current = self.current.lock();
        if current.as_ref() == Some(id) {
            *current = None;
            true
        } else {
            false
        }
    }

    /// The visible tooltip, if any.
    #[must_use]
    pub fn current(&self) -> Option<ElementId> {
        self.current.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ElementId {
        ElementId::from_encoded(s).unwrap()
    }

    #[test]
    fn test_show_replaces_previous() {
        let board = VisibleTooltip::new();
        assert_eq!(board.show(&id("A")), None);
        assert_eq!(board.show(&id("A")), None, "same id is not a replacement");
        assert_eq!(board.show(&id("B")), Some(id("A")));
        assert_eq!(board.current(), Some(id("B")));
    }

    #[test]
    fn test_clear_only_own_id() {
        let board = VisibleTooltip::new();
        board.show(&id("B"));
        assert!(!board.clear_if(&id("A")));
        assert_eq!(board.current(), Some(id("B")));
        assert!(board.clear_if(&id("B")));
        assert_eq!(board.current(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let board = VisibleTooltip::new();
        let other = board.clone();
        other.show(&id("A"));
        assert_eq!(board.current(), Some(id("A")));
    }
}
