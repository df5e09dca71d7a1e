//! Command line options and resolved runtime configuration.
//!
//! Paths not given on the command line default to the platform directories:
//!
//! - Linux: `~/.local/share/task-manager/` (data) and `~/.config/task-manager/`
//! - macOS: `~/Library/Application Support/com.example.task-manager/`
//! - Windows: `%APPDATA%\example\task-manager\`

use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::normalize_level;

const DB_FILE_NAME: &str = "tasks.db";
const SETTINGS_FILE_NAME: &str = "settings.toml";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, Parser)]
#[command(name = "task-manager", version, about = "Manage your tasks from the terminal")]
pub struct Cli {
    /// SQLite database file holding the tasks
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// TOML file holding the theme preferences
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// trace | debug | info | warn | error
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// UI refresh interval in milliseconds
    #[arg(long, default_value_t = 250)]
    pub tick_ms: u64,

    /// How long a delete or completion can be undone, in seconds
    #[arg(long, default_value_t = 5)]
    pub undo_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub settings_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
    pub tick_rate: Duration,
    pub undo_window: Duration,
}

// Platform data and config directories
#[derive(Debug, Clone)]
pub struct BaseDirs {
    pub data_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl BaseDirs {
    pub fn from_platform() -> Option<BaseDirs> {
        ProjectDirs::from("com", "example", "task-manager").map(|dirs| BaseDirs {
            data_dir: dirs.data_dir().to_path_buf(),
            config_dir: dirs.config_dir().to_path_buf(),
        })
    }
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<AppConfig, ConfigError> {
        AppConfig::resolve(cli, BaseDirs::from_platform())
    }

    // Explicit paths always win; platform directories are only needed for the rest
    pub fn resolve(cli: &Cli, dirs: Option<BaseDirs>) -> Result<AppConfig, ConfigError> {
        let log_level = normalize_level(&cli.log_level)?;
        let dirs = dirs.as_ref();
        Ok(AppConfig {
            db_path: pick(&cli.db, dirs, |d| d.data_dir.join(DB_FILE_NAME))?,
            settings_path: pick(&cli.settings, dirs, |d| d.config_dir.join(SETTINGS_FILE_NAME))?,
            log_dir: pick(&cli.log_dir, dirs, |d| d.data_dir.join(LOG_DIR_NAME))?,
            log_level,
            tick_rate: Duration::from_millis(cli.tick_ms.max(1)),
            undo_window: Duration::from_secs(cli.undo_secs),
        })
    }
}

fn pick(
    explicit: &Option<PathBuf>,
    dirs: Option<&BaseDirs>,
    fallback: impl FnOnce(&BaseDirs) -> PathBuf,
) -> Result<PathBuf, ConfigError> {
    match (explicit, dirs) {
        (Some(path), _) => Ok(path.clone()),
        (None, Some(dirs)) => Ok(fallback(dirs)),
        (None, None) => Err(ConfigError::NoProjectDirs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs() -> Option<BaseDirs> {
        Some(BaseDirs {
            data_dir: PathBuf::from("/data"),
            config_dir: PathBuf::from("/config"),
        })
    }

    #[test]
    fn defaults_come_from_platform_dirs() {
        let cli = Cli::parse_from(["task-manager"]);
        let config = AppConfig::resolve(&cli, dirs()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/tasks.db"));
        assert_eq!(config.settings_path, PathBuf::from("/config/settings.toml"));
        assert_eq!(config.log_dir, PathBuf::from("/data/logs"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.tick_rate, Duration::from_millis(250));
        assert_eq!(config.undo_window, Duration::from_secs(5));
    }

    #[test]
    fn explicit_paths_override_and_need_no_platform_dirs() {
        let cli = Cli::parse_from([
            "task-manager",
            "--db",
            "/tmp/t.db",
            "--settings",
            "/tmp/s.toml",
            "--log-dir",
            "/tmp/logs",
            "--log-level",
            "DEBUG",
            "--undo-secs",
            "0",
        ]);
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/t.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.undo_window, Duration::ZERO);
    }

    #[test]
    fn missing_platform_dirs_is_an_error_when_needed() {
        let cli = Cli::parse_from(["task-manager"]);
        assert!(matches!(
            AppConfig::resolve(&cli, None),
            Err(ConfigError::NoProjectDirs)
        ));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let cli = Cli::parse_from(["task-manager", "--log-level", "loud"]);
        assert!(matches!(
            AppConfig::resolve(&cli, dirs()),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
