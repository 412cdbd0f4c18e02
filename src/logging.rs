use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{self, RollingFileAppender},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LoggingConfig, LoggingRotation};

const LOG_FILE_PREFIX: &str = "concord.log";

/// Keeps the background log writer alive. Dropping it flushes pending lines.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
    session_id: String,
}

impl LoggingGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Installs the global subscriber.
///
/// With `file_enabled`, events matching `filter` go to a rolling JSON file
/// and only warnings reach stderr. Otherwise they are printed to stderr.
pub fn init_tracing(logging_config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = build_env_filter(&logging_config.filter)?;

    let (file_layer, stderr_layer, worker_guard) = if logging_config.file_enabled {
        if logging_config.dir.as_os_str().is_empty() {
            return Err(anyhow!("logging.dir cannot be empty"));
        }
        fs::create_dir_all(&logging_config.dir).with_context(|| {
            format!(
                "failed to create logging directory {}",
                logging_config.dir.display()
            )
        })?;

        let appender = build_rolling_appender(&logging_config.dir, &logging_config.rotation);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        let file_layer = fmt::layer()
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(true)
            .with_current_span(true)
            .with_span_list(true)
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(env_filter);
        let stderr_layer = logging_config.stderr_warn_enabled.then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(LevelFilter::WARN)
                .boxed()
        });
        (Some(file_layer), stderr_layer, Some(worker_guard))
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(env_filter)
            .boxed();
        (None, Some(stderr_layer), None)
    };

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    let session_id = Uuid::now_v7().to_string();
    tracing::info!(
        target: "logging",
        session_id = %session_id,
        file_enabled = logging_config.file_enabled,
        dir = %logging_config.dir.display(),
        filter = %logging_config.filter,
        rotation = ?logging_config.rotation,
        "logging_initialized"
    );

    Ok(LoggingGuard {
        _worker_guard: worker_guard,
        session_id,
    })
}

fn build_env_filter(filter: &str) -> Result<EnvFilter> {
    if filter.trim().is_empty() {
        return Err(anyhow!("logging.filter cannot be empty"));
    }
    EnvFilter::try_new(filter).with_context(|| format!("failed to parse logging.filter '{filter}'"))
}

fn build_rolling_appender(log_dir: &Path, rotation: &LoggingRotation) -> RollingFileAppender {
    match rotation {
        LoggingRotation::Daily => rolling::daily(log_dir, LOG_FILE_PREFIX),
        LoggingRotation::Hourly => rolling::hourly(log_dir, LOG_FILE_PREFIX),
        LoggingRotation::Never => rolling::never(log_dir, LOG_FILE_PREFIX),
    }
}
