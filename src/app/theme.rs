// Terminal colors derived from the saved preferences
use ratatui::style::Color;

use crate::app::models::Priority;
use crate::app::preferences::{Preferences, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub dark: bool,
    pub accent: Color,
    pub foreground: Color,
    pub background: Color,
    pub muted: Color,
}

impl Palette {
    pub fn from_preferences(preferences: &Preferences, system_is_dark: bool) -> Palette {
        let Rgb(r, g, b) = preferences.primary_rgb();
        let dark = preferences.theme_mode.is_dark(system_is_dark);
        if dark {
            Palette {
                dark,
                accent: Color::Rgb(r, g, b),
                foreground: Color::White,
                background: Color::Rgb(18, 18, 18),
                muted: Color::Rgb(120, 120, 120),
            }
        } else {
            Palette {
                dark,
                accent: Color::Rgb(r, g, b),
                foreground: Color::Black,
                background: Color::Rgb(250, 250, 250),
                muted: Color::Rgb(110, 110, 110),
            }
        }
    }

    pub fn priority(&self, priority: Priority) -> Color {
        match priority {
            Priority::Low => Color::Green,
            Priority::Medium => Color::Yellow,
            Priority::High => Color::Red,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::from_preferences(&Preferences::default(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::preferences::ThemeMode;

    #[test]
    fn accent_follows_primary_color() {
        let preferences = Preferences {
            primary_color: "#FF5722".into(),
            theme_mode: ThemeMode::Light,
        };
        let palette = Palette::from_preferences(&preferences, true);
        assert_eq!(palette.accent, Color::Rgb(0xFF, 0x57, 0x22));
        assert!(!palette.dark);
        assert_eq!(palette.foreground, Color::Black);
    }

    #[test]
    fn system_mode_uses_terminal_darkness() {
        let preferences = Preferences::default();
        assert!(Palette::from_preferences(&preferences, true).dark);
        assert!(!Palette::from_preferences(&preferences, false).dark);
        assert_eq!(
            Palette::default().accent,
            Color::Rgb(0x62, 0x00, 0xEE)
        );
    }
}
