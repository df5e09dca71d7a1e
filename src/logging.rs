//! File logging for the terminal application.
//!
//! The UI owns the terminal in alternate-screen mode, so log records go to a
//! rotating file instead of stderr. Records use a flat `key=value` layout,
//! e.g. `event=task_add module=service status=ok id=3`.
//!
//! Initialization is idempotent for the same directory and never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{AppError, ConfigError};

const LOG_FILE_BASENAME: &str = "task-manager";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    handle: LoggerHandle,
}

/// Starts file logging in `log_dir` at `level`.
///
/// Calling it again with the same directory and level is a no-op; any other
/// combination is rejected.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), AppError> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING_STATE.get() {
        return check_same(state, level, log_dir);
    }

    std::fs::create_dir_all(log_dir).map_err(|err| {
        AppError::Logging(format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        ))
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| AppError::Logging(format!("invalid log level `{level}`: {err}")))?
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
        .map_err(|err| AppError::Logging(format!("failed to start logger: {err}")))?;

    let state = LOGGING_STATE.get_or_init(|| LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        handle,
    });

    install_panic_hook();
    info!(
        "event=app_start module=logging status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        state.level,
        state.log_dir.display()
    );
    Ok(())
}

/// Flushes buffered records; call before the process exits.
pub fn flush_logging() {
    if let Some(state) = LOGGING_STATE.get() {
        state.handle.flush();
    }
}

pub fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}

fn check_same(state: &LoggingState, level: &str, log_dir: &Path) -> Result<(), AppError> {
    if state.log_dir != log_dir {
        return Err(AppError::Logging(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.log_dir.display(),
            log_dir.display()
        )));
    }
    if state.level != level {
        return Err(AppError::Logging(format!(
            "logging already initialized with level `{}`; refusing to switch to `{level}`",
            state.level
        )));
    }
    Ok(())
}

fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic_captured module=logging status=error location={location} payload={}",
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        flush_logging();
        previous_hook(panic_info);
    }));
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(
            normalize_level("verbose"),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn sanitize_message_flattens_and_truncates() {
        assert_eq!(sanitize_message("a\nb", 10), "a b");
        assert_eq!(sanitize_message("abcdef", 3), "abc...");
    }

    #[test]
    fn init_is_idempotent_for_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        init_logging("info", dir.path()).unwrap();
        init_logging("info", dir.path()).unwrap();

        let other = tempfile::tempdir().unwrap();
        assert!(init_logging("info", other.path()).is_err());
        assert!(init_logging("debug", dir.path()).is_err());
        flush_logging();
    }
}
