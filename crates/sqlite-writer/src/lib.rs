//! sqlite-writer: applies SQL requests received over pub/sub to SQLite.
//!
//! A single subscription on a fixed topic delivers JSON envelopes of the
//! form `{"sql": "...", "params": [...]}`. Each one is decoded and executed
//! against the local database. Failures are logged and the message is
//! dropped; nothing is acknowledged, retried or answered.
//!
//! # Architecture
//!
//! ```text
//! NATS subject  -> Dispatcher -> RequestHandler -> SqliteStore
//!                  (task per      (decode, run,    (dedicated
//!                   message)       log)             SQLite thread)
//! ```

pub mod app;
pub mod bus;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod request;

#[cfg(test)]
mod tests;

pub use bus::{BusConnection, BusMessage, MessageSource, Subscription};
pub use config::WriterConfig;
pub use dispatcher::{DispatchStats, Dispatcher};
pub use error::{WriterError, WriterResult};
pub use handler::{HandleOutcome, RequestHandler, StatementExecutor};
pub use request::SqlRequest;
