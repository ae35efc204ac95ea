//! sqlite-writer binary entry point.
//!
//! Usage: sqlite-writer [run] [--database-url <url>] [--nats-url <url>]
//!        sqlite-writer publish --sql <sql> [--param <value>]...
//!
//! Settings fall back to environment variables, which may come from a
//! `.env` file in the working directory.

use clap::{Args, Parser, Subcommand};
use observability::LogFormat;
use sqlite_writer::config::{self, EnvFileStatus, DEFAULT_NATS_URL, DEFAULT_TOPIC};
use sqlite_writer::{app, SqlRequest, WriterConfig, WriterResult};
use std::path::PathBuf;
use tracing::{error, info};

/// Applies SQL requests received over pub/sub to a local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "sqlite-writer")]
#[command(about = "Applies SQL requests received over pub/sub to a local SQLite database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // `run` settings when no subcommand is given
    #[command(flatten)]
    run: RunArgs,

    /// NATS server URL.
    #[arg(long, env = "NATS_URL", default_value = DEFAULT_NATS_URL, global = true)]
    nats_url: String,

    /// Topic carrying SQL requests.
    #[arg(long, env = "SQLITE_WRITER_TOPIC", default_value = DEFAULT_TOPIC, global = true)]
    topic: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "SQLITE_WRITER_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Log output format (compact, json).
    #[arg(long, env = "SQLITE_WRITER_LOG_FORMAT", default_value = "compact", global = true)]
    log_format: LogFormat,

    /// Environment file loaded before anything else, if present.
    ///
    /// Read ahead of clap by `config::env_file_arg`; declared here so it
    /// parses and shows up in `--help`.
    #[allow(dead_code)]
    #[arg(long, default_value = config::DEFAULT_ENV_FILE, global = true)]
    env_file: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// SQLite database path or URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Subscribe and apply requests (default)
    Run(RunArgs),
    /// Publish one request and exit
    Publish {
        /// SQL text.
        #[arg(long)]
        sql: String,

        /// Positional parameter; JSON scalars keep their type, anything else is text.
        #[arg(long = "param")]
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> WriterResult<()> {
    let env_file = config::env_file_arg(std::env::args());
    let env_status = config::load_env_file(&env_file);

    let cli = Cli::parse();

    observability::init_with_config(observability::LogConfig {
        service_name: "sqlite-writer".into(),
        default_level: cli.log_level.clone(),
        format: cli.log_format,
    });

    match env_status {
        Ok(EnvFileStatus::Loaded(path)) => {
            info!(path = %path.display(), "Loaded environment file");
        }
        Ok(EnvFileStatus::Missing(path)) => {
            info!(
                path = %path.display(),
                "Environment file not found, using process environment"
            );
        }
        Err(e) => {
            error!(path = %env_file.display(), error = %e, "Failed to load environment file");
            return Err(e);
        }
    }

    let result = match cli.command.unwrap_or(Commands::Run(cli.run)) {
        Commands::Run(args) => {
            app::run(build_config(cli.nats_url, cli.topic, args.database_url)).await
        }
        Commands::Publish { sql, params } => {
            publish(&cli.nats_url, &cli.topic, sql, &params).await
        }
    };

    if let Err(e) = &result {
        error!(error = %e, "sqlite-writer exited with error");
    }
    result
}

fn build_config(nats_url: String, topic: String, database_url: Option<String>) -> WriterConfig {
    let mut config = WriterConfig::new(database_url.unwrap_or_default());
    config.nats_url = nats_url;
    config.topic = topic;
    config
}

async fn publish(nats_url: &str, topic: &str, sql: String, raw_params: &[String]) -> WriterResult<()> {
    let params = raw_params
        .iter()
        .map(|raw| app::parse_cli_param(raw))
        .collect::<WriterResult<Vec<_>>>()?;

    app::publish(nats_url, topic, &SqlRequest::new(sql, params)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_runs_with_top_level_args() {
        let cli = Cli::try_parse_from(["sqlite-writer", "--database-url", "writer.db"]).unwrap();
        assert!(cli.command.is_none());

        match cli.command.unwrap_or(Commands::Run(cli.run)) {
            Commands::Run(args) => assert_eq!(args.database_url.as_deref(), Some("writer.db")),
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_publish_collects_params() {
        let cli = Cli::try_parse_from([
            "sqlite-writer",
            "publish",
            "--sql",
            "INSERT INTO t(a) VALUES (?, ?)",
            "--param",
            "1",
            "--param",
            "two",
            "--nats-url",
            "nats://broker:4222",
        ])
        .unwrap();

        assert_eq!(cli.nats_url, "nats://broker:4222");
        match cli.command {
            Some(Commands::Publish { sql, params }) => {
                assert_eq!(sql, "INSERT INTO t(a) VALUES (?, ?)");
                assert_eq!(params, vec!["1", "two"]);
            }
            other => panic!("expected publish, got {other:?}"),
        }
    }
}
