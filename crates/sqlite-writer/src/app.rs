//! Process-level flows: the long-running writer and the one-shot publisher.

use crate::bus::{self, redact_url, BusConnection};
use crate::config::WriterConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{WriterError, WriterResult};
use crate::handler::RequestHandler;
use crate::request::SqlRequest;
use std::sync::Arc;
use tracing::{info, warn};
use writer_database::{SqlParam, SqliteStore};

/// Connect, subscribe and apply requests until the process is stopped.
///
/// The bus is connected before the database is opened, and both before the
/// topic is subscribed. Any failure on that path is returned immediately.
/// Returns `Ok` on Ctrl-C and [`WriterError::SubscriptionClosed`] if the bus
/// stops delivering.
pub async fn run(config: WriterConfig) -> WriterResult<()> {
    config.validate()?;

    info!(
        nats_url = %redact_url(&config.nats_url),
        database_url = %config.database_url,
        topic = %config.topic,
        "Starting sqlite-writer"
    );

    let bus = BusConnection::connect(&config.nats_url).await?;
    let store = SqliteStore::open(&config.database_url).await?;
    let subscription = bus.subscribe(&config.topic).await?;

    let handler = Arc::new(RequestHandler::new(store));
    let dispatcher = Dispatcher::new(subscription, handler);

    info!(topic = %config.topic, "Waiting for SQL requests...");

    tokio::select! {
        stats = dispatcher.run() => {
            warn!(
                topic = %config.topic,
                received = stats.received,
                "Subscription ended"
            );
            Err(WriterError::SubscriptionClosed(config.topic))
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, exiting...");
            Ok(())
        }
    }
}

/// Publish a single request on `topic`.
///
/// Returns once the server has accepted it. Whether any writer is
/// subscribed is not known to the publisher.
pub async fn publish(nats_url: &str, topic: &str, request: &SqlRequest) -> WriterResult<()> {
    let payload = request.encode()?;
    bus::publish(nats_url, topic, payload).await?;

    info!(topic = %topic, param_count = request.params.len(), "Request published");
    Ok(())
}

/// Parse a command-line parameter.
///
/// Valid JSON scalars keep their type (`42`, `1.5`, `true`, `null`,
/// `"quoted"`); anything that is not JSON is taken as text.
pub fn parse_cli_param(raw: &str) -> WriterResult<SqlParam> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => SqlParam::try_from(value)
            .map_err(|e| WriterError::Config(format!("parameter '{raw}': {e}"))),
        Err(_) => Ok(SqlParam::Text(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_param() {
        assert_eq!(parse_cli_param("42").unwrap(), SqlParam::Integer(42));
        assert_eq!(parse_cli_param("1.5").unwrap(), SqlParam::Real(1.5));
        assert_eq!(parse_cli_param("true").unwrap(), SqlParam::Bool(true));
        assert_eq!(parse_cli_param("null").unwrap(), SqlParam::Null);
        assert_eq!(
            parse_cli_param("\"42\"").unwrap(),
            SqlParam::Text("42".to_string())
        );
        assert_eq!(
            parse_cli_param("default").unwrap(),
            SqlParam::Text("default".to_string())
        );
        assert!(parse_cli_param("[1, 2]").is_err());
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_config_before_connecting() {
        let result = run(WriterConfig::new("")).await;
        assert!(matches!(result, Err(WriterError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_bus_is_fatal_before_database_open() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("never-created.db");

        let mut config = WriterConfig::new(db_path.to_str().unwrap());
        config.nats_url = "nats://127.0.0.1:1".to_string();

        let result = run(config).await;
        assert!(matches!(result, Err(WriterError::Connect(_))));
        assert!(!db_path.exists());
    }
}
