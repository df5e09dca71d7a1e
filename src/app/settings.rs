use log::warn;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::app::preferences::{parse_hex_color, PreferenceStore, Preferences, Rgb, ThemeMode};
use crate::app::theme::Palette;

const MAX_COLOR_INPUT_LEN: usize = 7;

// State object for the preferences dialog
#[derive(Debug, Default)]
pub struct SettingsDialogState {
    pub dialog_active: bool,
    color_input: String,
    theme_mode: ThemeMode,
    system_is_dark: bool,
    error_message: Option<String>,
}

impl SettingsDialogState {
    pub fn open(&mut self, preferences: &Preferences, system_is_dark: bool) {
        self.dialog_active = true;
        self.color_input = editable_color(&preferences.primary_color);
        self.theme_mode = preferences.theme_mode;
        self.system_is_dark = system_is_dark;
        self.error_message = None;
    }

    pub fn close(&mut self) {
        self.dialog_active = false;
        self.error_message = None;
    }

    pub fn color_input(&self) -> &str {
        &self.color_input
    }

    pub fn is_dark(&self) -> bool {
        self.theme_mode.is_dark(self.system_is_dark)
    }

    // Flip between an explicit DARK and LIGHT and persist the choice right away
    pub fn toggle_dark_mode(&mut self, store: &PreferenceStore) {
        let mode = if self.is_dark() {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        match store.save_theme_mode(mode) {
            Ok(()) => self.theme_mode = mode,
            Err(err) => {
                warn!("event=prefs_save module=settings status=error key=theme_mode error={err}");
                self.error_message = Some(format!("Could not save theme: {err}"));
            }
        }
    }

    // Edits must keep the leading '#' and stay within 7 chars; clearing leaves '#'
    fn apply_edit(&mut self, new_value: String) {
        if new_value.starts_with('#') && new_value.chars().count() <= MAX_COLOR_INPUT_LEN {
            self.color_input = new_value;
        } else if new_value.is_empty() {
            self.color_input = "#".to_string();
        }
    }

    pub fn input(&mut self, to_insert: char) {
        let mut new_value = self.color_input.clone();
        new_value.push(to_insert);
        self.apply_edit(new_value);
    }

    pub fn delete_char(&mut self) {
        let mut new_value = self.color_input.clone();
        new_value.pop();
        self.apply_edit(new_value);
    }

    // Preview of the color being typed; invalid input shows the default
    pub fn preview(&self) -> Rgb {
        Preferences {
            primary_color: self.color_input.clone(),
            theme_mode: self.theme_mode,
        }
        .primary_rgb()
    }

    pub fn save(&mut self, store: &PreferenceStore) {
        match store.save_primary_color(&self.color_input) {
            Ok(()) => self.close(),
            Err(err) => {
                warn!("event=prefs_save module=settings status=error key=primary_color error={err}");
                self.error_message = Some(format!("Could not save color: {err}"));
            }
        }
    }
}

// Stored colors the field cannot hold (#AARRGGBB, garbage) are reduced to
// something it can, so backspace always works
fn editable_color(stored: &str) -> String {
    if stored.starts_with('#') && stored.chars().count() <= MAX_COLOR_INPUT_LEN {
        return stored.to_string();
    }
    match parse_hex_color(stored) {
        Some(Rgb(r, g, b)) => format!("#{r:02X}{g:02X}{b:02X}"),
        None => "#".to_string(),
    }
}

// Returns the UI content for the preferences dialog
pub fn get_settings_ui<'a>(state: &SettingsDialogState, palette: &Palette) -> Vec<Line<'a>> {
    let text = Style::new().fg(palette.foreground);
    let Rgb(r, g, b) = state.preview();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Dark mode:     ", text),
            Span::styled(
                if state.is_dark() { "[on]" } else { "[off]" },
                text.add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::styled(
            if state.theme_mode == ThemeMode::System {
                "               Follows system theme"
            } else {
                "               Manual override"
            },
            Style::new().fg(palette.muted),
        ),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Primary color: ", text),
            Span::styled("  ", Style::new().bg(Color::Rgb(r, g, b))),
            Span::raw(" "),
            Span::styled(state.color_input.clone(), text),
            Span::styled(" ", Style::new().fg(Color::Black).bg(palette.foreground)),
        ]),
    ];

    if parse_hex_color(&state.color_input).is_none() {
        lines.push(Line::styled(
            "               e.g. #FF5722",
            Style::new().fg(palette.muted),
        ));
    }

    lines.push(Line::raw(""));
    if let Some(ref error_message) = state.error_message {
        lines.push(Line::styled(error_message.clone(), Style::new().fg(Color::Red)));
        lines.push(Line::raw(""));
    }

    lines.push(Line::styled(
        "Tab - toggle dark mode, Enter - save, Esc - back",
        text,
    ));
    lines
}
