//! # Tooltip Controller
//!
//! Drives one tooltip through its [`TooltipPhase`]s. The controller is
//! synchronous: it consumes events and returns [`Command`]s, and the
//! runtime carries them out. Requests are identified by a
//! [`RequestTicket`], so an answer that arrives after a reset is dropped.
//!
//! ## Hover flow
//!
//! ```text
//! pointer_enter
//!   Loaded ──────────────► Show
//!   Loading ─────────────► Show loading fallback (if any)
//!   Unloaded ─┬─ two-request ──► Checking ── check answer ─┬─► Loading ─► content answer ─► Loaded
//!             │                                            ├─► Loaded (missing/empty fallback)
//!             │                                            └─► Removed
//!             └─ single ───────► Loading ──────────────────────► content answer ─┬─► Loaded
//!                                                                                └─► Removed
//! failure / timeout ─► Unloaded (box cleared)
//! ```

use std::sync::Arc;

use linktip_shared::{
    ClientExport, ElementId, FallbackKind, LinkAnnotation, QueryOption, QueryOptions, TooltipQuery,
    TooltipQueryResponse,
};
use tracing::debug;

use crate::placeholder::substitute;
use crate::state::{ClientTooltipState, PhaseEvent, TooltipPhase};
use crate::transport::TransportError;

/// Which of the two requests a ticket belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Metadata-only check.
    Check,
    /// Content plus any pending metadata.
    Content,
}

/// Identifies one issued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    generation: u64,
    kind: RequestKind,
}

impl RequestTicket {
    /// The request kind.
    #[must_use]
    pub const fn kind(self) -> RequestKind {
        self.kind
    }
}

/// What the runtime must do for this tooltip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Send `query`; report the outcome with `ticket`.
    Request {
        /// Ticket to report with.
        ticket: RequestTicket,
        /// The query.
        query: TooltipQuery,
    },
    /// Replace the box content.
    SetContent {
        /// New content.
        html: String,
        /// Preload before showing.
        preload: bool,
    },
    /// Show the box and make it the visible tooltip.
    Show,
    /// Hide the box if it is still the visible tooltip.
    Hide,
    /// Empty and hide the box.
    Clear,
    /// Remove the box and the link's handlers for good.
    Remove,
}

/// State machine for one tooltip box.
#[derive(Debug, Clone)]
pub struct TooltipController {
    id: ElementId,
    export: Arc<ClientExport>,
    state: ClientTooltipState,
    generation: u64,
}

impl TooltipController {
    /// Registers a link. When the early phase already settled on a fallback,
    /// the box is filled right away and the controller starts out loaded.
    #[must_use]
    pub fn register(annotation: &LinkAnnotation, export: Arc<ClientExport>) -> (Self, Vec<Command>) {
        let mut controller = Self {
            id: annotation.element_id.clone(),
            export,
            state: ClientTooltipState::from_annotation(annotation),
            generation: 0,
        };
        let mut commands = Vec::new();
        if controller.state.missing_page || controller.state.empty_title {
            controller.settle(&mut commands);
        }
        (controller, commands)
    }

    /// The element id.
    #[must_use]
    pub const fn id(&self) -> &ElementId {
        &self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ClientTooltipState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> TooltipPhase {
        self.state.phase
    }

    /// The pointer entered the link or its tooltip box.
    pub fn pointer_enter(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.state.phase == TooltipPhase::Removed {
            return commands;
        }
        self.state.show_when_loaded = true;
        match self.state.phase {
            TooltipPhase::Loaded => commands.push(Command::Show),
            TooltipPhase::Loading if self.export.loading.is_some() => commands.push(Command::Show),
            TooltipPhase::Unloaded => {
                let check = self.options(RequestKind::Check);
                if self.export.loading.is_some() && self.export.use_two_request_process && !check.is_empty() {
                    self.state.advance(PhaseEvent::BeginCheck);
                    debug!(id = %self.id, "tooltip checking");
                    commands.push(self.request(RequestKind::Check, check));
                } else {
                    self.begin_load(PhaseEvent::BeginLoad, &mut commands);
                }
            }
            _ => {}
        }
        commands
    }

    /// The pointer left the link or its tooltip box.
    pub fn pointer_leave(&mut self) -> Vec<Command> {
        self.state.show_when_loaded = false;
        if self.state.phase == TooltipPhase::Removed {
            Vec::new()
        } else {
            vec![Command::Hide]
        }
    }

    /// An answer arrived.
    pub fn on_response(&mut self, ticket: RequestTicket, response: &TooltipQueryResponse) -> Vec<Command> {
        let mut commands = Vec::new();
        if !self.is_current(ticket) {
            debug!(id = %self.id, ?ticket, "stale tooltip response dropped");
            return commands;
        }
        let late = self.export.late;
        if late.category_filter && response.passes_category_filter == Some(false) {
            self.reject(&mut commands);
            return commands;
        }
        if late.title_derivation {
            self.merge_title(response);
        }
        match ticket.kind {
            RequestKind::Check => {
                // A title was asked for and none came back: it did not parse.
                if late.title_derivation && self.state.titles.tooltip.is_none() && !self.state.empty_title {
                    self.reject(&mut commands);
                    return commands;
                }
                self.state.missing_page = response.exists == Some(false);
                if self.state.missing_page || self.state.empty_title {
                    self.settle(&mut commands);
                } else {
                    self.begin_load(PhaseEvent::CheckPassed, &mut commands);
                }
            }
            RequestKind::Content => {
                if late.exists_check {
                    if let Some(exists) = response.exists {
                        self.state.missing_page = !exists;
                    }
                }
                if self.state.missing_page || self.state.empty_title {
                    self.settle(&mut commands);
                } else {
                    match response.html().filter(|html| !html.trim().is_empty()) {
                        Some(html) => self.fill(html.to_string(), self.state.is_image, &mut commands),
                        None => self.reject(&mut commands),
                    }
                }
            }
        }
        commands
    }

    /// A request failed or timed out. The tooltip goes back to unloaded, so
    /// the next hover tries again.
    pub fn on_failure(&mut self, ticket: RequestTicket, error: &TransportError) -> Vec<Command> {
        if !self.is_current(ticket) {
            return Vec::new();
        }
        debug!(id = %self.id, %error, "tooltip reset");
        self.state.advance(PhaseEvent::Reset);
        self.state.show_when_loaded = false;
        self.generation += 1;
        vec![Command::Clear]
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        let expected = match ticket.kind {
            RequestKind::Check => TooltipPhase::Checking,
            RequestKind::Content => TooltipPhase::Loading,
        };
        ticket.generation == self.generation && self.state.phase == expected
    }

    fn options(&self, kind: RequestKind) -> QueryOptions {
        let late = self.export.late;
        let tooltip_known = self.state.titles.tooltip.is_some();
        let mut options = match kind {
            RequestKind::Check => QueryOptions::empty(),
            RequestKind::Content => QueryOptions::empty().with(QueryOption::Text),
        };
        // The category verdict must be taken on the followed target on both requests.
        if late.follow && self.state.can_late_follow && (!tooltip_known || late.category_filter) {
            options.insert(QueryOption::Follow);
        }
        if late.exists_check {
            options.insert(QueryOption::Exists);
        }
        if late.category_filter {
            options.insert(QueryOption::Cat);
        }
        if late.title_derivation && !tooltip_known {
            options.insert(QueryOption::Title);
            options.insert(QueryOption::Image);
        }
        options
    }

    fn request(&self, kind: RequestKind, options: QueryOptions) -> Command {
        Command::Request {
            ticket: RequestTicket {
                generation: self.generation,
                kind,
            },
            query: TooltipQuery {
                target: Some(self.state.titles.target.clone()),
                tooltip: self.state.titles.tooltip.clone(),
                options,
            },
        }
    }

    fn begin_load(&mut self, event: PhaseEvent, commands: &mut Vec<Command>) {
        if !self.state.advance(event) {
            return;
        }
        debug!(id = %self.id, "tooltip loading");
        if let Some(loading) = &self.export.loading {
            commands.push(Command::SetContent {
                html: substitute(&loading.html, &self.state.titles),
                preload: loading.preload,
            });
            if self.state.show_when_loaded {
                commands.push(Command::Show);
            }
        }
        commands.push(self.request(RequestKind::Content, self.options(RequestKind::Content)));
    }

    fn merge_title(&mut self, response: &TooltipQueryResponse) {
        if let Some(title) = &response.tooltip_title {
            if title.trim().is_empty() {
                self.state.empty_title = true;
            } else {
                self.state.titles.tooltip = Some(title.clone());
                self.state.empty_title = false;
            }
        }
        if let Some(is_image) = response.is_image {
            self.state.is_image = is_image;
        }
    }

    /// Shows the missing-page or empty-title fallback, or removes the
    /// tooltip when the applicable fallback is not configured.
    fn settle(&mut self, commands: &mut Vec<Command>) {
        let kind = [
            (self.state.missing_page, FallbackKind::MissingPage),
            (self.state.empty_title, FallbackKind::EmptyTitle),
        ]
        .into_iter()
        .find(|(flag, kind)| *flag && self.export.fallback(*kind).is_some())
        .map(|(_, kind)| kind);

        let Some(fallback) = kind.and_then(|kind| self.export.fallback(kind)).cloned() else {
            self.reject(commands);
            return;
        };
        self.fill(substitute(&fallback.html, &self.state.titles), fallback.preload, commands);
    }

    fn fill(&mut self, html: String, preload: bool, commands: &mut Vec<Command>) {
        if !self.state.advance(PhaseEvent::ContentReady) {
            return;
        }
        debug!(id = %self.id, "tooltip loaded");
        commands.push(Command::SetContent { html, preload });
        if self.state.show_when_loaded {
            commands.push(Command::Show);
        }
    }

    fn reject(&mut self, commands: &mut Vec<Command>) {
        if self.state.advance(PhaseEvent::Reject) {
            debug!(id = %self.id, "tooltip removed");
            commands.push(Command::Remove);
        }
    }
}
