//! # Display Seam
//!
//! Where tooltip boxes meet the screen. Geometry is the display's business;
//! the runtime only says what goes in a box and whether it is visible.

use std::collections::HashMap;

use linktip_shared::ElementId;

/// Tooltip boxes, one per element id.
pub trait TooltipDisplay {
    /// Replaces the content of a box. `preload` asks for images to be loaded
    /// before the box is shown.
    fn set_content(&mut self, id: &ElementId, html: &str, preload: bool);
    /// Makes a box visible, positioned at the pointer.
    fn show(&mut self, id: &ElementId);
    /// Hides a box.
    fn hide(&mut self, id: &ElementId);
    /// Drops a box and the link's hover handlers for good.
    fn remove(&mut self, id: &ElementId);
}

/// One call on a [`RecordingDisplay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    /// `set_content`
    SetContent {
        /// Box.
        id: ElementId,
        /// New content.
        html: String,
        /// Preload requested.
        preload: bool,
    },
    /// `show`
    Show(ElementId),
    /// `hide`
    Hide(ElementId),
    /// `remove`
    Remove(ElementId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct BoxState {
    html: String,
    visible: bool,
    removed: bool,
}

/// Display that keeps every call and the resulting box states.
#[derive(Clone, Debug, Default)]
pub struct RecordingDisplay {
    events: Vec<DisplayEvent>,
    boxes: HashMap<ElementId, BoxState>,
}

impl RecordingDisplay {
    /// Creates an empty display.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call, oldest first.
    #[must_use]
    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// Current content of a box.
    #[must_use]
    pub fn html(&self, id: &ElementId) -> Option<&str> {
        self.boxes.get(id).map(|b| b.html.as_str())
    }

    /// True if the box is currently shown.
    #[must_use]
    pub fn is_visible(&self, id: &ElementId) -> bool {
        self.boxes.get(id).is_some_and(|b| b.visible)
    }

    /// True if the box was removed.
    #[must_use]
    pub fn is_removed(&self, id: &ElementId) -> bool {
        self.boxes.get(id).is_some_and(|b| b.removed)
    }

    /// Ids of all visible boxes.
    #[must_use]
    pub fn visible(&self) -> Vec<&ElementId> {
        let mut ids: Vec<_> = self
            .boxes
            .iter()
            .filter(|(_, b)| b.visible)
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids
    }
}

impl TooltipDisplay for RecordingDisplay {
    fn set_content(&mut self, id: &ElementId, html: &str, preload: bool) {
        self.boxes.entry(id.clone()).or_default().html = html.to_string();
        self.events.push(DisplayEvent::SetContent {
            id: id.clone(),
            html: html.to_string(),
            preload,
        });
    }

    fn show(&mut self, id: &ElementId) {
        self.boxes.entry(id.clone()).or_default().visible = true;
        self.events.push(DisplayEvent::Show(id.clone()));
    }

    fn hide(&mut self, id: &ElementId) {
        self.boxes.entry(id.clone()).or_default().visible = false;
        self.events.push(DisplayEvent::Hide(id.clone()));
    }

    fn remove(&mut self, id: &ElementId) {
        let state = self.boxes.entry(id.clone()).or_default();
        state.visible = false;
        state.removed = true;
        state.html.clear();
        self.events.push(DisplayEvent::Remove(id.clone()));
    }
}
