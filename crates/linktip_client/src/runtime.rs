//! # Client Runtime
//!
//! Owns every tooltip controller on a page, applies their commands to the
//! display and runs their requests through the transport.
//!
//! ```text
//! pointer_enter(id) ─► controller ─► commands ─┬─► display / board
//!                          ▲                   └─► transport.query ── timeout(60s) ─┐
//!                          └──────── on_response / on_failure ◄──────────────────────┘
//! ```
//!
//! Locks are taken for single synchronous steps only and are never held
//! while a request is awaited, so hovers on different links interleave
//! freely on one cooperative event loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use linktip_shared::{ClientExport, ElementId, LinkAnnotation, REQUEST_TIMEOUT_SECS};
use parking_lot::Mutex;
use tracing::debug;

use crate::board::VisibleTooltip;
use crate::controller::{Command, TooltipController};
use crate::display::TooltipDisplay;
use crate::state::{ClientTooltipState, TooltipPhase};
use crate::transport::{TooltipTransport, TransportError};

/// The tooltip runtime for one page.
pub struct TooltipRuntime<T, D> {
    export: Arc<ClientExport>,
    transport: T,
    display: Mutex<D>,
    controllers: Mutex<HashMap<ElementId, TooltipController>>,
    board: VisibleTooltip,
    request_timeout: Duration,
}

impl<T: TooltipTransport, D: TooltipDisplay> TooltipRuntime<T, D> {
    /// Creates a runtime with the standard request timeout.
    #[must_use]
    pub fn new(export: ClientExport, transport: T, display: D) -> Self {
        Self {
            export: Arc::new(export),
            transport,
            display: Mutex::new(display),
            controllers: Mutex::new(HashMap::new()),
            board: VisibleTooltip::new(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Registers a link. Links sharing an element id share one tooltip; the
    /// first registration wins. Returns false for a repeat.
    pub fn register(&self, annotation: &LinkAnnotation) -> bool {
        let id = annotation.element_id.clone();
        let commands = {
            let mut controllers = self.controllers.lock();
            if controllers.contains_key(&id) {
                return false;
            }
            let (controller, commands) = TooltipController::register(annotation, Arc::clone(&self.export));
            controllers.insert(id.clone(), controller);
            commands
        };
        for command in commands {
            self.apply(&id, command);
        }
        true
    }

    /// Registers every link on a page. Returns how many new tooltips exist.
    pub fn register_all<'a>(&self, annotations: impl IntoIterator<Item = &'a LinkAnnotation>) -> usize {
        annotations
            .into_iter()
            .filter(|annotation| self.register(annotation))
            .count()
    }

    /// Handles the pointer entering a link and runs any requests it starts
    /// to completion.
    pub async fn pointer_enter(&self, id: &ElementId) {
        let commands = self.step(id, TooltipController::pointer_enter);
        self.drive(id, commands).await;
    }

    /// Handles the pointer leaving a link.
    pub fn pointer_leave(&self, id: &ElementId) {
        for command in self.step(id, TooltipController::pointer_leave) {
            self.apply(id, command);
        }
    }

    /// Phase of a tooltip, `None` if it was never registered.
    #[must_use]
    pub fn phase(&self, id: &ElementId) -> Option<TooltipPhase> {
        self.controllers.lock().get(id).map(TooltipController::phase)
    }

    /// Snapshot of a tooltip's state.
    #[must_use]
    pub fn state(&self, id: &ElementId) -> Option<ClientTooltipState> {
        self.controllers.lock().get(id).map(|c| c.state().clone())
    }

    /// The visible tooltip board.
    #[must_use]
    pub const fn board(&self) -> &VisibleTooltip {
        &self.board
    }

    /// The transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs `f` against the display.
    pub fn with_display<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        let display = self.display.lock();
        f(&display)
    }

    fn step(&self, id: &ElementId, f: impl FnOnce(&mut TooltipController) -> Vec<Command>) -> Vec<Command> {
        self.controllers.lock().get_mut(id).map(f).unwrap_or_default()
    }

    async fn drive(&self, id: &ElementId, mut commands: Vec<Command>) {
        loop {
            let mut pending = None;
            for command in commands {
                match command {
                    Command::Request { ticket, query } => pending = Some((ticket, query)),
                    other => self.apply(id, other),
                }
            }
            let Some((ticket, query)) = pending else {
                return;
            };

            debug!(id = %id, options = ?query.options, "tooltip request");
            let outcome = match tokio::time::timeout(self.request_timeout, self.transport.query(query)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(TransportError::Timeout {
                    secs: self.request_timeout.as_secs(),
                }),
            };
            commands = self.step(id, |controller| match &outcome {
                Ok(response) => controller.on_response(ticket, response),
                Err(error) => controller.on_failure(ticket, error),
            });
        }
    }

    fn apply(&self, id: &ElementId, command: Command) {
        let mut display = self.display.lock();
        match command {
            Command::SetContent { html, preload } => display.set_content(id, &html, preload),
            Command::Show => {
                if let Some(previous) = self.board.show(id) {
                    display.hide(&previous);
                }
                display.show(id);
            }
            Command::Hide => {
                if self.board.clear_if(id) {
                    display.hide(id);
                }
            }
            Command::Clear => {
                self.board.clear_if(id);
                display.set_content(id, "", false);
                display.hide(id);
            }
            Command::Remove => {
                self.board.clear_if(id);
                display.remove(id);
            }
            Command::Request { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::RecordingDisplay;
    use crate::transport::ScriptedTransport;
    use linktip_shared::{FallbackContent, LateStages, LinkTitles, TextPayload, TooltipFlags, TooltipQueryResponse};

    fn id(s: &str) -> ElementId {
        ElementId::from_encoded(s).unwrap()
    }

    fn annotation(name: &str) -> LinkAnnotation {
        LinkAnnotation {
            element_id: id(name),
            flags: TooltipFlags::default(),
            titles: LinkTitles {
                target: name.into(),
                direct: None,
                tooltip: Some(format!("Tooltip:{name}")),
            },
        }
    }

    fn export() -> ClientExport {
        ClientExport {
            late: LateStages::default(),
            loading: Some(FallbackContent {
                html: "Loading $1".into(),
                preload: false,
            }),
            ..ClientExport::default()
        }
    }

    fn content(html: &str) -> TooltipQueryResponse {
        TooltipQueryResponse {
            text: Some(TextPayload { html: html.into() }),
            ..TooltipQueryResponse::default()
        }
    }

    fn runtime() -> TooltipRuntime<ScriptedTransport, RecordingDisplay> {
        TooltipRuntime::new(export(), ScriptedTransport::new(), RecordingDisplay::new())
    }

    #[tokio::test]
    async fn test_hover_loads_and_shows() {
        let runtime = runtime();
        assert!(runtime.register(&annotation("Foo")));
        runtime.transport().push_ok(content("<p>Foo</p>"));

        runtime.pointer_enter(&id("Foo")).await;
        assert_eq!(runtime.phase(&id("Foo")), Some(TooltipPhase::Loaded));
        assert_eq!(runtime.board().current(), Some(id("Foo")));
        runtime.with_display(|d| {
            assert_eq!(d.html(&id("Foo")), Some("<p>Foo</p>"));
            assert!(d.is_visible(&id("Foo")));
        });

        runtime.pointer_leave(&id("Foo"));
        assert_eq!(runtime.board().current(), None);
        runtime.pointer_enter(&id("Foo")).await;
        assert_eq!(runtime.transport().queries().len(), 1, "loaded tooltips are not fetched again");
    }

    #[tokio::test]
    async fn test_shared_element_id_registers_once() {
        let runtime = runtime();
        assert_eq!(runtime.register_all(&[annotation("Foo"), annotation("Foo"), annotation("Bar")]), 2);
    }

    #[tokio::test]
    async fn test_only_one_visible() {
        let runtime = runtime();
        runtime.register_all(&[annotation("A"), annotation("B")]);
        runtime.transport().push_ok(content("a"));
        runtime.transport().push_ok(content("b"));

        runtime.pointer_enter(&id("A")).await;
        runtime.pointer_enter(&id("B")).await;
        runtime.with_display(|d| assert_eq!(d.visible(), vec![&id("B")]));

        runtime.pointer_leave(&id("A"));
        assert_eq!(runtime.board().current(), Some(id("B")), "leaving A does not hide B");
        runtime.with_display(|d| assert!(d.is_visible(&id("B"))));
    }

    #[tokio::test]
    async fn test_failure_resets() {
        let runtime = runtime();
        runtime.register(&annotation("Foo"));
        runtime.transport().push_err(TransportError::Failed("offline".into()));

        runtime.pointer_enter(&id("Foo")).await;
        assert_eq!(runtime.phase(&id("Foo")), Some(TooltipPhase::Unloaded));
        runtime.with_display(|d| {
            assert_eq!(d.html(&id("Foo")), Some(""));
            assert!(!d.is_visible(&id("Foo")));
        });
        assert_eq!(runtime.board().current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resets_after_sixty_seconds() {
        let runtime = runtime();
        runtime.register(&annotation("Foo"));
        runtime
            .transport()
            .push(Duration::from_secs(REQUEST_TIMEOUT_SECS + 30), Ok(content("too late")));

        let started = tokio::time::Instant::now();
        runtime.pointer_enter(&id("Foo")).await;
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(REQUEST_TIMEOUT_SECS), "{waited:?}");
        assert!(waited < Duration::from_secs(REQUEST_TIMEOUT_SECS + 30), "{waited:?}");
        assert_eq!(runtime.phase(&id("Foo")), Some(TooltipPhase::Unloaded));
        runtime.with_display(|d| assert_ne!(d.html(&id("Foo")), Some("too late")));

        runtime.transport().push_ok(content("<p>Foo</p>"));
        runtime.pointer_enter(&id("Foo")).await;
        assert_eq!(runtime.phase(&id("Foo")), Some(TooltipPhase::Loaded), "next hover retries");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_response_after_leave_stays_hidden() {
        let runtime = runtime();
        runtime.register_all(&[annotation("A"), annotation("B")]);
        runtime.transport().push(Duration::from_secs(10), Ok(content("a")));
        runtime.transport().push_ok(content("b"));

        let a = id("A");
        let slow = runtime.pointer_enter(&a);
        let moved = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            runtime.pointer_leave(&id("A"));
            runtime.pointer_enter(&id("B")).await;
        };
        tokio::join!(slow, moved);

        assert_eq!(runtime.phase(&id("A")), Some(TooltipPhase::Loaded));
        assert_eq!(runtime.board().current(), Some(id("B")));
        runtime.with_display(|d| {
            assert!(!d.is_visible(&id("A")));
            assert!(d.is_visible(&id("B")));
        });
    }

    #[tokio::test]
    async fn test_unknown_id_is_ignored() {
        let runtime = runtime();
        runtime.pointer_enter(&id("Nope")).await;
        runtime.pointer_leave(&id("Nope"));
        assert_eq!(runtime.phase(&id("Nope")), None);
        assert!(runtime.transport().queries().is_empty());
    }
}
