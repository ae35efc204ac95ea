//! Message consumption loop.
//!
//! Pulls messages from a [`MessageSource`] and hands each one to the
//! [`RequestHandler`] on its own Tokio task. There is no cap on in-flight
//! messages and no ordering between them; SQLite access is serialised by
//! the store's executor thread, not here.

use crate::bus::MessageSource;
use crate::handler::{HandleOutcome, RequestHandler, StatementExecutor};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info};

/// Counters for a finished dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub received: u64,
    pub executed: u64,
    pub decode_failed: u64,
    pub execute_failed: u64,
    /// Handler tasks that panicked or were cancelled.
    pub aborted: u64,
}

impl DispatchStats {
    fn record(&mut self, joined: Result<HandleOutcome, JoinError>) {
        match joined {
            Ok(HandleOutcome::Executed(_)) => self.executed += 1,
            Ok(HandleOutcome::DecodeFailed) => self.decode_failed += 1,
            Ok(HandleOutcome::ExecuteFailed) => self.execute_failed += 1,
            Err(e) => {
                error!(error = %e, "Request handler task failed");
                self.aborted += 1;
            }
        }
    }

    /// Messages whose handler has finished, one way or another.
    pub fn completed(&self) -> u64 {
        self.executed + self.decode_failed + self.execute_failed + self.aborted
    }
}

/// Fans messages out to per-message handler tasks.
pub struct Dispatcher<S, E> {
    source: S,
    handler: Arc<RequestHandler<E>>,
}

impl<S, E> Dispatcher<S, E>
where
    S: MessageSource,
    E: StatementExecutor,
{
    pub fn new(source: S, handler: Arc<RequestHandler<E>>) -> Self {
        Self { source, handler }
    }

    /// Run until the source closes, then wait for in-flight handlers.
    pub async fn run(mut self) -> DispatchStats {
        let mut stats = DispatchStats::default();
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                message = self.source.next_message() => {
                    let Some(message) = message else { break };
                    stats.received += 1;

                    let handler = Arc::clone(&self.handler);
                    in_flight.spawn(async move { handler.handle(&message).await });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    stats.record(joined);
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            stats.record(joined);
        }

        info!(
            received = stats.received,
            executed = stats.executed,
            decode_failed = stats.decode_failed,
            execute_failed = stats.execute_failed,
            aborted = stats.aborted,
            "Message source closed"
        );
        stats
    }
}
