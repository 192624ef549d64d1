//! In-process transport.
//!
//! Answers client queries with [`TooltipQueryHandler`] directly. Requests
//! and responses still go through their JSON wire form, so the client sees
//! exactly what a remote endpoint would send.

use std::future::{ready, Future};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use linktip_client::{TooltipTransport, TransportError, TransportResult};
use linktip_core::{Configuration, TooltipQueryHandler, WikiBackend};
use linktip_shared::{TooltipQuery, TooltipQueryResponse};
use tracing::debug;

fn wire_error(error: &serde_json::Error) -> TransportError {
    TransportError::Failed(format!("wire encoding: {error}"))
}

/// Routes client queries into the core query handler.
pub struct InProcessTransport<B> {
    config: Arc<Configuration>,
    backend: Arc<B>,
    requests: AtomicUsize,
}

impl<B: WikiBackend> InProcessTransport<B> {
    /// Creates a transport over `backend`.
    #[must_use]
    pub fn new(config: Arc<Configuration>, backend: Arc<B>) -> Self {
        Self {
            config,
            backend,
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of queries answered or rejected so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn answer(&self, query: &TooltipQuery) -> TransportResult<TooltipQueryResponse> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let request = serde_json::to_string(query).map_err(|e| wire_error(&e))?;
        let query: TooltipQuery = serde_json::from_str(&request).map_err(|e| wire_error(&e))?;

        let handler = TooltipQueryHandler::new(&self.config, self.backend.as_ref());
        let response = handler
            .handle(&query)
            .map_err(|error| TransportError::Failed(error.to_string()))?;

        let body = serde_json::to_string(&response).map_err(|e| wire_error(&e))?;
        debug!(%request, %body, "in-process tooltip query");
        serde_json::from_str(&body).map_err(|e| wire_error(&e))
    }
}

impl<B: WikiBackend> TooltipTransport for InProcessTransport<B> {
    fn query(&self, query: TooltipQuery) -> impl Future<Output = TransportResult<TooltipQueryResponse>> + Send {
        ready(self.answer(&query))
    }
}
