use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

const FALLBACK_THEME: &str = "catppuccin-mocha";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

/// Hex strings as written in the theme files. Accessors convert on use so a
/// bad value degrades to white instead of failing the whole theme.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub accent: String,
    pub accent_dim: String,
    pub highlight: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    /// Learner's chat bubbles
    pub user_msg: String,
    /// Tutor replies and analysis text
    pub model_msg: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// A user theme under `<config_dir>/k53prep/themes` shadows a bundled
    /// theme of the same name.
    pub fn load(name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");

        if let Some(config_dir) = dirs::config_dir()
            && let Ok(content) = fs::read_to_string(config_dir.join("k53prep").join("themes").join(&filename))
            && let Some(theme) = Self::parse(&content)
        {
            return Some(theme);
        }

        ThemeAssets::get(&filename)
            .and_then(|file| String::from_utf8(file.data.into_owned()).ok())
            .and_then(|content| Self::parse(&content))
    }

    fn parse(content: &str) -> Option<Self> {
        match toml::from_str::<Theme>(content) {
            Ok(theme) => Some(theme),
            Err(err) => {
                tracing::warn!(%err, "ignoring malformed theme file");
                None
            }
        }
    }

    /// Bundled theme names, sorted.
    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(str::to_string))
            .collect();
        names.sort();
        names
    }

    /// The theme after `current` in sorted order, wrapping around. An unknown
    /// current name starts from the first theme.
    pub fn next_name(current: &str) -> Option<String> {
        let names = Self::available_themes();
        let next = names
            .iter()
            .position(|n| n == current)
            .map_or(0, |i| (i + 1) % names.len());
        names.into_iter().nth(next)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load(FALLBACK_THEME).unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            muted: "#6c7086".to_string(),
            accent: "#89b4fa".to_string(),
            accent_dim: "#45475a".to_string(),
            highlight: "#f9e2af".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            bar_filled: "#a6e3a1".to_string(),
            bar_empty: "#313244".to_string(),
            user_msg: "#f5c2e7".to_string(),
            model_msg: "#94e2d5".to_string(),
            error: "#f38ba8".to_string(),
            warning: "#f9e2af".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let digits = hex.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
        };
        match (digits.len(), channel(0..2), channel(2..4), channel(4..6)) {
            (6, Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
            _ => Color::White,
        }
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn accent_dim(&self) -> Color { Self::parse_color(&self.accent_dim) }
    pub fn highlight(&self) -> Color { Self::parse_color(&self.highlight) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn user_msg(&self) -> Color { Self::parse_color(&self.user_msg) }
    pub fn model_msg(&self) -> Color { Self::parse_color(&self.model_msg) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.iter().any(|n| n == FALLBACK_THEME));
        for name in names {
            assert!(Theme::load(&name).is_some(), "theme {name} failed to parse");
        }
    }

    #[test]
    fn test_parse_color_falls_back_to_white() {
        assert_eq!(ThemeColors::parse_color("#zzzzzz"), Color::White);
        assert_eq!(ThemeColors::parse_color("#fff"), Color::White);
        assert_eq!(ThemeColors::parse_color("#ff0000"), Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_next_name_wraps_around() {
        let names = Theme::available_themes();
        let last = names.last().cloned().unwrap();
        assert_eq!(Theme::next_name(&last), names.first().cloned());
        assert_eq!(Theme::next_name(&names[0]), names.get(1).cloned());
        assert_eq!(Theme::next_name("no-such-theme"), names.first().cloned());
    }

    #[test]
    fn test_malformed_theme_rejected() {
        assert!(Theme::parse("name = \"broken\"\n[colors]\nbg = 3").is_none());
    }
}
