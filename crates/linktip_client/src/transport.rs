//! # Transport
//!
//! The seam between the client runtime and the query endpoint. The runtime
//! never talks to a network directly; it hands a [`TooltipQuery`] to a
//! [`TooltipTransport`] and waits, under a timeout, for the answer.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use linktip_shared::{TooltipQuery, TooltipQueryResponse};
use parking_lot::Mutex;
use thiserror::Error;

/// Request failures. Both reset the tooltip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint could not be reached or refused the request.
    #[error("tooltip request failed: {0}")]
    Failed(String),

    /// No answer within the timeout.
    #[error("tooltip request timed out after {secs}s")]
    Timeout {
        /// Timeout that expired.
        secs: u64,
    },
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Sends late-phase queries to the endpoint.
pub trait TooltipTransport {
    /// Sends one query and waits for the answer.
    fn query(
        &self,
        query: TooltipQuery,
    ) -> impl Future<Output = TransportResult<TooltipQueryResponse>> + Send;
}

/// One scripted answer for [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    /// How long the answer takes.
    pub delay: Duration,
    /// The answer.
    pub result: TransportResult<TooltipQueryResponse>,
}

/// Test transport answering from a queue and recording every query.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    queries: Mutex<Vec<TooltipQuery>>,
}

impl ScriptedTransport {
    /// Creates a transport with no scripted answers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an immediate answer.
    pub fn push_ok(&self, response: TooltipQueryResponse) {
        self.push(Duration::ZERO, Ok(response));
    }

    /// Queues an immediate failure.
    pub fn push_err(&self, error: TransportError) {
        self.push(Duration::ZERO, Err(error));
    }

    /// Queues an answer that arrives after `delay`.
    pub fn push(&self, delay: Duration, result: TransportResult<TooltipQueryResponse>) {
        self.replies.lock().push_back(ScriptedReply { delay, result });
    }

    /// Queries sent so far.
    #[must_use]
    pub fn queries(&self) -> Vec<TooltipQuery> {
        self.queries.lock().clone()
    }

    /// Answers not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.replies.lock().len()
    }
}

impl TooltipTransport for ScriptedTransport {
    fn query(
        &self,
        query: TooltipQuery,
    ) -> impl Future<Output = TransportResult<TooltipQueryResponse>> + Send {
        self.queries.lock().push(query);
        let reply = self.replies.lock().pop_front();
        async move {
            let Some(reply) = reply else {
                return Err(TransportError::Failed("no scripted reply".into()));
            };
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linktip_shared::{QueryOption, QueryOptions};

    fn query() -> TooltipQuery {
        TooltipQuery {
            target: Some("Foo".into()),
            tooltip: None,
            options: QueryOptions::empty().with(QueryOption::Text),
        }
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let transport = ScriptedTransport::new();
        transport.push_ok(TooltipQueryResponse {
            exists: Some(true),
            ..TooltipQueryResponse::default()
        });
        transport.push_err(TransportError::Failed("down".into()));

        assert_eq!(transport.query(query()).await.unwrap().exists, Some(true));
        assert!(transport.query(query()).await.is_err());
        assert_eq!(transport.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let transport = ScriptedTransport::new();
        assert!(matches!(
            transport.query(query()).await,
            Err(TransportError::Failed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_reply() {
        let transport = ScriptedTransport::new();
        transport.push(Duration::from_secs(5), Ok(TooltipQueryResponse::default()));
        let started = tokio::time::Instant::now();
        transport.query(query()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
