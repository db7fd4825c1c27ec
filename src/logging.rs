//! Log setup: human-readable lines on stdout plus one file per day under
//! `log_dir`, keeping the most recent `RETAINED_LOG_FILES` files.

use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::{WatchError, WatchResult};

pub const RETAINED_LOG_FILES: usize = 30;
const LOG_FILE_PREFIX: &str = "listing_watch";
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Daily rolling file appender for `dir`.
pub fn file_appender(dir: &Path) -> WatchResult<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(RETAINED_LOG_FILES)
        .build(dir)
        .map_err(|e| WatchError::Logging(format!("{}: {e}", dir.display())))
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level` when set. Keep the returned guard alive for
/// the life of the process or buffered file lines are lost.
pub fn init_logging(dir: &Path, level: LevelFilter) -> WatchResult<WorkerGuard> {
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
                .with_target(false),
        )
        .with(
            fmt::layer()
                .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| WatchError::Logging(e.to_string()))?;

    Ok(guard)
}
