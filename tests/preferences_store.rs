use std::fs;

use task_manager::app::preferences::{Rgb, DEFAULT_PRIMARY_COLOR};
use task_manager::{PreferenceStore, Preferences, ThemeMode};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = PreferenceStore::new(dir.path().join("settings.toml"));

    let preferences = store.try_load().unwrap();
    assert_eq!(preferences, Preferences::default());
    assert_eq!(preferences.primary_color, DEFAULT_PRIMARY_COLOR);
    assert_eq!(preferences.theme_mode, ThemeMode::System);
}

#[test]
fn saved_keys_are_read_back_independently() {
    let dir = tempfile::tempdir().unwrap();
    let store = PreferenceStore::new(dir.path().join("nested").join("settings.toml"));

    store.save_primary_color("#FF5722").unwrap();
    store.save_theme_mode(ThemeMode::Dark).unwrap();

    let preferences = store.load();
    assert_eq!(preferences.primary_color, "#FF5722");
    assert_eq!(preferences.theme_mode, ThemeMode::Dark);
    assert_eq!(preferences.primary_rgb(), Rgb(0xFF, 0x57, 0x22));

    let text = fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("primary_color = \"#FF5722\""), "{text}");
    assert!(text.contains("theme_mode = \"DARK\""), "{text}");
}

#[test]
fn corrupt_file_falls_back_silently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "primary_color = [not toml").unwrap();
    let store = PreferenceStore::new(&path);

    assert!(store.try_load().is_err());
    assert_eq!(store.load(), Preferences::default());

    // Saving over a corrupt file starts from defaults
    store.save_theme_mode(ThemeMode::Light).unwrap();
    let preferences = store.load();
    assert_eq!(preferences.theme_mode, ThemeMode::Light);
    assert_eq!(preferences.primary_color, DEFAULT_PRIMARY_COLOR);
}

#[test]
fn unknown_theme_and_bad_color_resolve_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "primary_color = \"purple\"\ntheme_mode = \"SEPIA\"\n").unwrap();
    let store = PreferenceStore::new(&path);

    let preferences = store.load();
    assert_eq!(preferences.theme_mode, ThemeMode::System);
    assert_eq!(preferences.primary_color, "purple");
    assert_eq!(preferences.primary_rgb(), Rgb(0x62, 0x00, 0xEE));
}
