//! Tracing subscriber setup.
//!
//! Logs go to stderr so they never interleave with the results printed on
//! stdout. `RUST_LOG` takes precedence over the configured filter.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{ReductionError, Result, ResultExt};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Build the `EnvFilter`, preferring `RUST_LOG` when it is set and valid.
pub fn build_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .map_err(|e| ReductionError::Config(format!("Invalid log filter {:?}: {}", directive, e)))
}

/// Install the global subscriber.
///
/// The returned guard flushes the log file on drop and must be kept alive
/// for the duration of the program.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(&config.filter)?;

    let stderr_layer: BoxedLayer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .boxed(),
    };

    let mut layers = vec![stderr_layer];
    let mut guard = None;

    if let Some(path) = &config.file {
        let (dir, file_name) = split_log_path(path).context("Invalid [logging] file setting")?;
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true)
                .boxed(),
        );
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| ReductionError::Config(format!("Failed to install log subscriber: {}", e)))?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ReductionError::Config(format!("Log file path {:?} has no file name", path)))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, file_name))
}
