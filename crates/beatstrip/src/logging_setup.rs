//! Logging initialization: console layer plus an optional non-blocking
//! file layer.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Logging configuration.
pub struct LogConfig {
    /// Default level directive (overridden by RUST_LOG)
    pub level: String,
    /// Mirror logs to stderr
    pub console_output: bool,
    /// Write logs to a file under `log_dir`
    pub file_output: bool,
    /// Directory for log files
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: true,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl LogConfig {
    fn current_log_path(&self) -> PathBuf {
        self.log_dir.join("beatstrip.log")
    }
}

/// Handle that keeps the logging worker thread alive
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Initialize the logging system
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    let env_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.clone()))
    };

    let console_layer = if config.console_output {
        Some(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .with_filter(env_filter()),
        )
    } else {
        None
    };

    let (file_layer, guard) = if config.file_output {
        std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;
        let log_path = config.current_log_path();
        let file = File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {:?}", log_path))?;
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_filter(env_filter());

        (
            Some(layer),
            Some(LogGuard {
                _guard: worker_guard,
            }),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized at level: {}", config.level);
    Ok(guard)
}
