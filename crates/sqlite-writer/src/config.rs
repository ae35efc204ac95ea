//! Configuration for sqlite-writer.

use crate::error::{WriterError, WriterResult};
use std::path::{Path, PathBuf};

/// NATS URL used when `NATS_URL` is not set.
pub const DEFAULT_NATS_URL: &str = "nats://127.0.0.1:4222";

/// Topic the writer subscribes to by default.
pub const DEFAULT_TOPIC: &str = "sqlite-requests";

/// Environment file read at startup when present.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Writer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// NATS server URL (`NATS_URL`)
    pub nats_url: String,

    /// SQLite location (`DATABASE_URL`)
    pub database_url: String,

    /// Topic carrying SQL requests
    pub topic: String,
}

impl WriterConfig {
    /// Create a config for the given database with default bus settings.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            nats_url: DEFAULT_NATS_URL.to_string(),
            database_url: database_url.into(),
            topic: DEFAULT_TOPIC.to_string(),
        }
    }

    /// Reject values that cannot possibly work before touching the network.
    pub fn validate(&self) -> WriterResult<()> {
        if self.nats_url.trim().is_empty() {
            return Err(WriterError::Config("NATS URL is empty".to_string()));
        }
        if self.database_url.trim().is_empty() {
            return Err(WriterError::Config(
                "DATABASE_URL is not set; pass --database-url or export DATABASE_URL".to_string(),
            ));
        }
        if self.topic.trim().is_empty() {
            return Err(WriterError::Config("topic is empty".to_string()));
        }
        Ok(())
    }
}

/// Result of looking for an environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFileStatus {
    Loaded(PathBuf),
    Missing(PathBuf),
}

/// Load `KEY=value` pairs from `path` into the process environment.
///
/// Variables already set in the environment win over the file. A missing
/// file is not an error.
pub fn load_env_file(path: &Path) -> WriterResult<EnvFileStatus> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(EnvFileStatus::Loaded(path.to_path_buf())),
        Err(e) if e.not_found() => Ok(EnvFileStatus::Missing(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// Find the `--env-file` value in raw process arguments.
///
/// The file has to be loaded before clap reads `env = ...` defaults, so this
/// runs ahead of the real argument parser.
pub fn env_file_arg<I>(args: I) -> PathBuf
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--env-file=") {
            return PathBuf::from(value);
        }
        if arg == "--env-file" {
            if let Some(value) = args.next() {
                return PathBuf::from(value);
            }
        }
    }
    PathBuf::from(DEFAULT_ENV_FILE)
}
