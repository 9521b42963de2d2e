//! Logging setup with optional file rotation.

use crate::{LauncherError, LauncherResult};

use dl_config::LauncherConfig;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt};

const MAX_LOG_FILES: usize = 7;

/// Install the global subscriber.
///
/// # Log Layers
/// - Console: stderr, so stdout stays free for the shell's output
/// - File: daily rotation, 7 files kept, only when `logging.file` is set
///
/// `RUST_LOG` takes precedence over the configured level. Records from the
/// `log` facade are bridged into tracing.
pub fn setup_logging(config: &LauncherConfig) -> LauncherResult<()> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(config.logging.colored)
        .with_writer(std::io::stderr);

    let file_layer = match (config.log_dir()?, config.logging.file.as_deref()) {
        (Some(logs_dir), Some(prefix)) => {
            std::fs::create_dir_all(&logs_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(MAX_LOG_FILES)
                .filename_prefix(prefix)
                .filename_suffix("log")
                .build(&logs_dir)
                .map_err(|e| LauncherError::logging(e.to_string()))?;

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .with_writer(file_appender),
            )
        }
        _ => None,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_directive()));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LauncherError::logging(e.to_string()))?;

    tracing_log::LogTracer::init().map_err(|e| LauncherError::logging(e.to_string()))?;

    Ok(())
}
