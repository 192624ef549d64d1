//! # Tooltip State
//!
//! The per-tooltip finite-state machine. One tooltip box exists per element
//! id, shared by every link that resolves to the same target page.
//!
//! ## Transition table
//!
//! ```text
//!             BeginCheck   BeginLoad   CheckPassed   ContentReady   Reject    Reset
//! Unloaded    Checking     Loading     -             Loaded         Removed   Unloaded
//! Checking    -            -           Loading       Loaded         Removed   Unloaded
//! Loading     -            -           -             Loaded         Removed   Unloaded
//! Loaded      -            -           -             -              Removed   Unloaded
//! Removed     -            -           -             -              -         -
//! ```
//!
//! `ContentReady` out of `Unloaded` happens at registration, when the early
//! phase already settled on a fallback. Out of `Checking` it happens when
//! the check itself settles on a fallback.

use linktip_shared::{LinkAnnotation, LinkTitles};

/// Lifecycle phase of one tooltip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TooltipPhase {
    /// Nothing requested yet, or reset after a failure.
    Unloaded,
    /// Metadata-only request in flight.
    Checking,
    /// Content request in flight.
    Loading,
    /// Content is in the tooltip box.
    Loaded,
    /// The link has no tooltip. Terminal.
    Removed,
}

impl Default for TooltipPhase {
    fn default() -> Self {
        Self::Unloaded
    }
}

/// Inputs to the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseEvent {
    /// A metadata-only request is issued.
    BeginCheck,
    /// A content request is issued.
    BeginLoad,
    /// The check found content worth loading.
    CheckPassed,
    /// Content or a fallback was placed in the box.
    ContentReady,
    /// A late stage decided there is no tooltip.
    Reject,
    /// Failure or timeout.
    Reset,
}

impl TooltipPhase {
    /// Looks up the transition table. `None` means the event is not valid
    /// in this phase.
    #[must_use]
    pub const fn next(self, event: PhaseEvent) -> Option<Self> {
        use PhaseEvent as E;
        use TooltipPhase as P;
        match (self, event) {
            (P::Removed, _) => None,
            (_, E::Reset) => Some(P::Unloaded),
            (_, E::Reject) => Some(P::Removed),
            (P::Unloaded, E::BeginCheck) => Some(P::Checking),
            (P::Unloaded, E::BeginLoad) | (P::Checking, E::CheckPassed) => Some(P::Loading),
            (P::Unloaded | P::Checking | P::Loading, E::ContentReady) => Some(P::Loaded),
            _ => None,
        }
    }

    /// A request is outstanding.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Checking | Self::Loading)
    }
}

/// Everything the client knows about one tooltip.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientTooltipState {
    /// Current phase.
    pub phase: TooltipPhase,
    /// Show the box as soon as content arrives.
    pub show_when_loaded: bool,
    /// The content should be preloaded before it is shown.
    pub is_image: bool,
    /// The client may still ask for redirect follow.
    pub can_late_follow: bool,
    /// The tooltip page is missing.
    pub missing_page: bool,
    /// The derived tooltip title is empty.
    pub empty_title: bool,
    /// Target, direct target and tooltip titles.
    pub titles: LinkTitles,
}

impl ClientTooltipState {
    /// Initial state for a freshly registered link.
    #[must_use]
    pub fn from_annotation(annotation: &LinkAnnotation) -> Self {
        Self {
            phase: TooltipPhase::Unloaded,
            show_when_loaded: false,
            is_image: annotation.flags.is_image,
            can_late_follow: annotation.flags.can_late_follow,
            missing_page: annotation.flags.missing_page,
            empty_title: annotation.flags.empty_title,
            titles: annotation.titles.clone(),
        }
    }

    /// Applies `event`, returning false and leaving the phase alone if the
    /// table has no entry for it.
    pub fn advance(&mut self, event: PhaseEvent) -> bool {
        match self.phase.next(event) {
            Some(next) => {
                self.phase = next;
                true
            }
            None => false,
        }
    }
}
