//! Per-message request handling.
//!
//! Decode the body, run it, log what happened. Nothing is sent back to the
//! producer and nothing is retried.

use crate::bus::BusMessage;
use crate::request::SqlRequest;
use async_trait::async_trait;
use tracing::{debug, error};
use writer_database::{DatabaseError, ExecSummary, SqliteStore};

/// Longest SQL prefix included in error logs.
const SQL_LOG_LIMIT: usize = 200;

/// Something that can run a decoded request.
#[async_trait]
pub trait StatementExecutor: Send + Sync + 'static {
    async fn execute(&self, request: SqlRequest) -> Result<ExecSummary, DatabaseError>;
}

#[async_trait]
impl StatementExecutor for SqliteStore {
    async fn execute(&self, request: SqlRequest) -> Result<ExecSummary, DatabaseError> {
        SqliteStore::execute(self, request.sql, request.params).await
    }
}

/// What happened to one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    Executed(ExecSummary),
    DecodeFailed,
    ExecuteFailed,
}

/// Stateless handler shared by every in-flight message.
pub struct RequestHandler<E> {
    executor: E,
}

impl<E: StatementExecutor> RequestHandler<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Handle one message.
    pub async fn handle(&self, message: &BusMessage) -> HandleOutcome {
        let request = match SqlRequest::decode(&message.payload) {
            Ok(request) => request,
            Err(e) => {
                error!(
                    topic = %message.topic,
                    payload_len = message.payload.len(),
                    error = %e,
                    "Failed to decode SQL request"
                );
                return HandleOutcome::DecodeFailed;
            }
        };

        let sql_preview = preview(&request.sql);
        let param_count = request.params.len();

        match self.executor.execute(request).await {
            Ok(summary) => {
                debug!(
                    topic = %message.topic,
                    statements = summary.statements,
                    rows_changed = summary.rows_changed,
                    rows_returned = summary.rows_returned,
                    "Executed SQL request"
                );
                HandleOutcome::Executed(summary)
            }
            Err(e) => {
                error!(
                    topic = %message.topic,
                    sql = %sql_preview,
                    param_count,
                    error = %e,
                    "Failed to execute SQL request"
                );
                HandleOutcome::ExecuteFailed
            }
        }
    }
}

fn preview(sql: &str) -> String {
    let trimmed = sql.trim();
    match trimmed.char_indices().nth(SQL_LOG_LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
