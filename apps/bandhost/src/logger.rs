//! Logging for the bandhost harness.
//!
//! Two sinks: a concise colored stream on stdout for watching the harness
//! live, and a verbose plain-text file (`bandhost.log`) for digging into a
//! session after the fact. Initialization is guarded so repeated calls are
//! harmless.

use crate::error::BandhostError;

use common::ErrorLocation;

use std::io::stdout;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{BrightBlack, Cyan, Green, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::{format_rfc3339, format_rfc3339_seconds};
use log::{LevelFilter, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

/// Tracks if logger initialization was already attempted.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

const LOG_FILE_NAME: &str = "bandhost.log";

/// Harness log level for debug builds.
#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

/// Harness log level for release builds.
#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Initialize the logger with dual output (stdout + file).
///
/// Safe to call more than once; only the first call in the process actually
/// installs the dispatcher, later calls log a warning and return Ok.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or the dispatcher
/// cannot be installed.
pub fn initialize(log_dir: &Path) -> Result<(), BandhostError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir);
        if result.is_ok() {
            info!("Logger initialized with level: {LOG_LEVEL:?}");
        }
    });

    result
}

#[track_caller]
fn initialize_internal(log_dir: &Path) -> Result<(), BandhostError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let colors = ColoredLevelConfig::new()
        .trace(BrightBlack)
        .debug(Cyan)
        .info(Green)
        .warn(Yellow)
        .error(Red);

    // The runtime's own internals are noise at the harness's level.
    let base_dispatch = Dispatch::new()
        .level(LOG_LEVEL)
        .level_for("tokio", LevelFilter::Warn)
        .level_for("mio", LevelFilter::Warn);

    // Stdout: short timestamp, colored level, no source position.
    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{date} {level:<5} {message}",
                date = format_rfc3339_seconds(SystemTime::now()),
                level = colors.color(record.level()),
                message = message,
            ))
        })
        .chain(stdout());

    // File: full timestamp, module target, and source position.
    let file_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{date} {level:<5} [{target}] {message} ({file}:{line})",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                target = record.target(),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(
            fern::log_file(&log_file_path).map_err(|e| BandhostError::Bandhost {
                message: format!("Failed to create log file: {e}"),
                location: ErrorLocation::from(std::panic::Location::caller()),
            })?,
        );

    base_dispatch
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| BandhostError::Bandhost {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(std::panic::Location::caller()),
        })?;

    Ok(())
}
