//! Core logging bootstrap.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Emit metadata-only diagnostic events (ids, years, counts). Review
//!   summaries are never written to logs.
//!
//! # Invariants
//! - Logging init is idempotent for the same level and directory.
//! - Logging initialization must not panic.
//! - Re-initialization with a different level or directory is rejected.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "staffreview";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: LevelFilter,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Initializes core logging with level and absolute directory.
///
/// # Errors
/// - `level` is not one of trace|debug|info|warn|error.
/// - `log_dir` is empty, relative, or cannot be created.
/// - Logging is already active with a different level or directory.
/// - The logger backend fails to start.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> Result<(), String> {
    let level = parse_level(level)?;
    let log_dir = check_log_dir(log_dir.as_ref())?;

    if let Some(state) = LOGGING_STATE.get() {
        return ensure_same_config(state, level, log_dir);
    }

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, log_dir))?;
    ensure_same_config(state, level, log_dir)
}

/// Returns `(level, log_dir)` when logging is active.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// Returns `debug` for debug builds and `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: LevelFilter, log_dir: &Path) -> Result<LoggingState, String> {
    std::fs::create_dir_all(log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let spec = LogSpecification::builder().default(level).build();
    let logger = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=core_init module=core status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );

    Ok(LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        _logger: logger,
    })
}

fn ensure_same_config(
    state: &LoggingState,
    level: LevelFilter,
    log_dir: &Path,
) -> Result<(), String> {
    if state.log_dir != log_dir {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.log_dir.display(),
            log_dir.display()
        ));
    }
    if state.level != level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        ));
    }
    Ok(())
}

/// `off` is rejected: callers disable logging by not passing a directory.
fn parse_level(level: &str) -> Result<LevelFilter, String> {
    let trimmed = level.trim();
    let parsed = if trimmed.eq_ignore_ascii_case("warning") {
        Ok(LevelFilter::Warn)
    } else {
        LevelFilter::from_str(trimmed)
    };
    match parsed {
        Ok(LevelFilter::Off) | Err(_) => Err(format!(
            "unsupported log level `{trimmed}`; expected trace|debug|info|warn|error"
        )),
        Ok(filter) => Ok(filter),
    }
}

fn check_log_dir(log_dir: &Path) -> Result<&Path, String> {
    if log_dir.as_os_str().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if !log_dir.is_absolute() {
        return Err(format!(
            "log_dir must be an absolute path, got `{}`",
            log_dir.display()
        ));
    }
    Ok(log_dir)
}

#[cfg(test)]
mod tests {
    use super::{check_log_dir, init_logging, logging_status, parse_level};
    use log::LevelFilter;
    use std::path::Path;

    #[test]
    fn parse_level_accepts_known_values() {
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(" warning ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("error").unwrap(), LevelFilter::Error);
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("off").is_err());
    }

    #[test]
    fn check_log_dir_rejects_relative_and_empty_paths() {
        let error = check_log_dir(Path::new("logs/dev")).unwrap_err();
        assert!(error.contains("absolute"));
        assert!(check_log_dir(Path::new("")).is_err());
    }

    #[test]
    fn init_logging_is_idempotent_for_same_config_and_rejects_conflicts() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        init_logging("info", first.path()).unwrap();
        init_logging("INFO", first.path()).unwrap();

        let level_error = init_logging("debug", first.path()).unwrap_err();
        assert!(level_error.contains("refusing to switch"));

        let dir_error = init_logging("info", second.path()).unwrap_err();
        assert!(dir_error.contains("refusing to switch"));

        let (active_level, active_dir) = logging_status().unwrap();
        assert_eq!(active_level, LevelFilter::Info);
        assert_eq!(active_dir, first.path());
    }
}
