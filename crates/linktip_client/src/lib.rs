//! # Linktip Client
//!
//! The hover-time half of linktip. Links arrive annotated by the renderer;
//! this crate decides, per tooltip box, what to request, what to show and
//! when to give up.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       TooltipRuntime                          │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────┐   commands   ┌─────────────────────┐  │
//! │  │ TooltipController  │ ───────────► │ TooltipDisplay      │  │
//! │  │ (per element id)   │              │ VisibleTooltip      │  │
//! │  └─────────▲──────────┘              └─────────────────────┘  │
//! │            │ responses                                        │
//! │  ┌─────────┴──────────┐                                       │
//! │  │ TooltipTransport   │  ◄── tokio::time::timeout(60s)        │
//! │  └────────────────────┘                                       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. At most one request in flight per tooltip; the phase enforces it.
//! 2. At most one tooltip visible at a time.
//! 3. A loading tooltip is never shown for a link that may end up with no
//!    tooltip; the render side negotiates the check request for that.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod board;
pub mod controller;
pub mod display;
pub mod placeholder;
pub mod runtime;
pub mod state;
pub mod transport;

pub use board::VisibleTooltip;
pub use controller::{Command, RequestKind, RequestTicket, TooltipController};
pub use display::{DisplayEvent, RecordingDisplay, TooltipDisplay};
pub use placeholder::substitute;
pub use runtime::TooltipRuntime;
pub use state::{ClientTooltipState, PhaseEvent, TooltipPhase};
pub use transport::{ScriptedReply, ScriptedTransport, TooltipTransport, TransportError, TransportResult};
