//! Interactor — interactive component session engine
//!
//! Attaches stateful, multi-step controls (paginated readers, confirm/cancel
//! selections, multi-option menus) to a message rendered on a chat platform
//! and routes asynchronous "component activated" events back to the owning
//! in-memory session and per-control handler.

pub mod cli;
pub mod config;
pub mod metrics;
pub mod platform;
pub mod session;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;

/// Application result type for consistent error handling
pub type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize tracing subscriber for logging
///
/// Returns the file-appender guard when a log file is configured; the guard
/// must stay alive for the duration of the process or buffered log lines are
/// dropped.
pub fn init_logging(level: &str, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("interactor={}", level).into());

    let (file_layer, guard) = match log_file {
        Some(path) if !path.trim().is_empty() => {
            let path = std::path::Path::new(path);
            let directory = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("log file path has no file name component")?;
            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}
