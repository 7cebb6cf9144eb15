//! Structured logging init, in the shape this codebase's other crates
//! use: a `tracing-subscriber` registry with console + rolling-file
//! layers, an `EnvFilter` seeded from configuration, and a handle whose
//! drop flushes the file writer.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Settings;

/// Lifecycle handle for the logging subsystem. Dropping it flushes the
/// non-blocking file writer.
pub struct LoggingHandle {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn shutdown(self) {
        drop(self);
    }
}

/// Initializes the global `tracing` subscriber from `settings`.
///
/// `log_dir = None` disables the file layer (used by tests, which
/// would otherwise race each other over log file handles).
pub fn init_logging(
    settings: &Settings,
    log_dir: Option<PathBuf>,
) -> Result<LoggingHandle, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .boxed();

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, "chainkv.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .json()
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %settings.log_level,
        "logging initialized"
    );

    Ok(LoggingHandle { _file_guard: guard })
}
