//! Error types for sqlite-writer.

use thiserror::Error;
use writer_database::DatabaseError;

/// sqlite-writer error type.
#[derive(Error, Debug)]
pub enum WriterError {
    /// Bus unreachable or URL unusable
    #[error("NATS connect error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// Topic subscription refused
    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// Publish not accepted
    #[error("NATS publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    /// Published message not confirmed by the server
    #[error("NATS flush error: {0}")]
    Flush(#[from] async_nats::client::FlushError),

    /// Datastore open or execution error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Request (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Environment file present but unreadable
    #[error("Environment file error: {0}")]
    EnvFile(#[from] dotenvy::Error),

    /// The bus stopped delivering messages
    #[error("Subscription to '{0}' closed")]
    SubscriptionClosed(String),
}

/// Result type for sqlite-writer operations.
pub type WriterResult<T> = Result<T, WriterError>;
