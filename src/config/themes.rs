use ratatui::style::Color;
use serde::{Deserialize, Deserializer};

use super::ThemeName;

impl ThemeName {
    /// Looks up a configured theme name, falling back to dark for names no palette exists for.
    pub fn resolve(name: &str) -> Self {
        name.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(theme = name, "unknown theme in config, falling back to dark");
            ThemeName::Dark
        })
    }
}

impl<'de> Deserialize<'de> for ThemeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ThemeName::resolve(&name))
    }
}

/// Colours the renderer pulls from instead of hard-coding per widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub muted: Color,
    pub star: Color,
    pub tag: Color,
    pub success: Color,
    pub error: Color,
    pub selection_fg: Color,
    pub selection_bg: Color,
}

impl Palette {
    pub fn for_theme(theme: ThemeName) -> Self {
        match theme {
            ThemeName::Dark => Self {
                accent: Color::Cyan,
                muted: Color::Gray,
                star: Color::Yellow,
                tag: Color::Green,
                success: Color::Green,
                error: Color::Red,
                selection_fg: Color::Black,
                selection_bg: Color::Blue,
            },
            ThemeName::Light => Self {
                accent: Color::Blue,
                muted: Color::DarkGray,
                star: Color::Rgb(200, 140, 0),
                tag: Color::Rgb(0, 120, 60),
                success: Color::Rgb(0, 120, 60),
                error: Color::Red,
                selection_fg: Color::White,
                selection_bg: Color::Blue,
            },
            ThemeName::HighContrast => Self {
                accent: Color::White,
                muted: Color::White,
                star: Color::LightYellow,
                tag: Color::LightGreen,
                success: Color::LightGreen,
                error: Color::LightRed,
                selection_fg: Color::Black,
                selection_bg: Color::White,
            },
            ThemeName::Solarized => Self {
                accent: Color::Rgb(38, 139, 210),
                muted: Color::Rgb(147, 161, 161),
                star: Color::Rgb(181, 137, 0),
                tag: Color::Rgb(133, 153, 0),
                success: Color::Rgb(133, 153, 0),
                error: Color::Rgb(220, 50, 47),
                selection_fg: Color::Rgb(253, 246, 227),
                selection_bg: Color::Rgb(38, 139, 210),
            },
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_theme(ThemeName::Dark)
    }
}
