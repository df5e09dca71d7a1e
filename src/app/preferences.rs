// Accent color and theme mode, kept as two strings in a TOML file
// Reading falls back to defaults on a missing or malformed file

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PreferencesError;

pub const DEFAULT_PRIMARY_COLOR: &str = "#6200EE";
pub const DEFAULT_PRIMARY_RGB: Rgb = Rgb(0x62, 0x00, 0xEE);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "LIGHT",
            ThemeMode::Dark => "DARK",
            ThemeMode::System => "SYSTEM",
        }
    }

    // Anything unrecognised follows the system
    pub fn parse(value: &str) -> ThemeMode {
        match value.trim() {
            "LIGHT" => ThemeMode::Light,
            "DARK" => ThemeMode::Dark,
            _ => ThemeMode::System,
        }
    }

    pub fn is_dark(self, system_is_dark: bool) -> bool {
        match self {
            ThemeMode::Dark => true,
            ThemeMode::Light => false,
            ThemeMode::System => system_is_dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Parses `#RRGGBB` or `#AARRGGBB`. The alpha channel is ignored.
pub fn parse_hex_color(text: &str) -> Option<Rgb> {
    let hex = text.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = match hex.len() {
        6 => hex,
        8 => &hex[2..],
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&rgb[i..i + 2], 16).ok();
    Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub primary_color: String,
    pub theme_mode: ThemeMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            theme_mode: ThemeMode::System,
        }
    }
}

impl Preferences {
    // The stored color may be any string; invalid input falls back to the default purple
    pub fn primary_rgb(&self) -> Rgb {
        parse_hex_color(&self.primary_color).unwrap_or(DEFAULT_PRIMARY_RGB)
    }
}

// On-disk shape. Every key is optional so partial files still load.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferencesFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme_mode: Option<String>,
}

impl From<PreferencesFile> for Preferences {
    fn from(file: PreferencesFile) -> Self {
        Preferences {
            primary_color: file
                .primary_color
                .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            theme_mode: file
                .theme_mode
                .as_deref()
                .map(ThemeMode::parse)
                .unwrap_or_default(),
        }
    }
}

pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> PreferenceStore {
        PreferenceStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Preferences {
        match self.try_load() {
            Ok(preferences) => preferences,
            Err(err) => {
                warn!("event=prefs_load module=preferences status=fallback error={err}");
                Preferences::default()
            }
        }
    }

    // A missing file is not an error, it just means nothing was saved yet
    pub fn try_load(&self) -> Result<Preferences, PreferencesError> {
        Ok(self.read_file()?.into())
    }

    pub fn save_primary_color(&self, color_hex: &str) -> Result<(), PreferencesError> {
        let mut file = self.read_file().unwrap_or_default();
        file.primary_color = Some(color_hex.to_string());
        self.write_file(&file)
    }

    pub fn save_theme_mode(&self, mode: ThemeMode) -> Result<(), PreferencesError> {
        let mut file = self.read_file().unwrap_or_default();
        file.theme_mode = Some(mode.as_str().to_string());
        self.write_file(&file)
    }

    fn read_file(&self) -> Result<PreferencesFile, PreferencesError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PreferencesFile::default())
            }
            Err(source) => {
                return Err(PreferencesError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(toml::from_str(&text)?)
    }

    fn write_file(&self, file: &PreferencesFile) -> Result<(), PreferencesError> {
        let io_err = |source| PreferencesError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = toml::to_string(file)?;
        fs::write(&self.path, text).map_err(io_err)?;
        debug!(
            "event=prefs_save module=preferences status=ok path={}",
            self.path.display()
        );
        Ok(())
    }
}

/// Guesses whether the terminal has a dark background from `COLORFGBG`
/// (`"fg;bg"` or `"fg;default;bg"`). Light backgrounds are color 7 or 15.
pub fn dark_from_colorfgbg(value: Option<&str>) -> bool {
    let Some(background) = value.and_then(|v| v.rsplit(';').next()) else {
        return true;
    };
    !matches!(background.trim(), "7" | "15")
}

pub fn system_prefers_dark() -> bool {
    dark_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}
