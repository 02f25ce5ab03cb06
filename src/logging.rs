//! Subscriber setup. Called once from `main`; the rest of the crate only emits `tracing` events.
//!
//! Logs go to stderr because stdout carries the MCP protocol. An optional file sink receives
//! the same events without ANSI colors.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `terragrunt_mcp=debug`. `RUST_LOG` wins if set.
    pub level: String,
    pub file: Option<PathBuf>,
}

/// Install the global subscriber. The returned guard flushes the file sink on drop and must be
/// held for the life of the process.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level '{}'", config.level))?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    match config.file {
        Some(ref path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(&dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .try_init()?;
            tracing::info!(file = %path.display(), "File logging enabled");
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()?;
            Ok(None)
        }
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path {} has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((dir.to_path_buf(), PathBuf::from(file_name)))
}
