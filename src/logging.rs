//! File-based logging
//!
//! The TUI owns the terminal, so tracing output goes to a daily rotating
//! file instead of stdout.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "voice-player";
const DEFAULT_FILTER: &str = "voice_player=debug,warn";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/voice-player.YYYY-MM-DD`. The level can be
/// overridden with `RUST_LOG`.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<()> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer flushes on guard drop; keep it for the whole process
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(dir = %log_dir.display(), "Logging initialized");
    Ok(())
}

/// Log the outcome of an engine or library operation
#[macro_export]
macro_rules! log_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "Operation succeeded"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Operation failed"),
        }
    };
}
