//! Theme palettes for the Quill desktop client.
//!
//! Three built-in themes (Light, Dark, Sepia) and five accent colors. The
//! `ThemeManager` turns a theme/accent pair into `egui::Visuals`, which is
//! the one place where the visual state of the whole window is changed.
//!
//! # Examples
//!
//! ```
//! use rquill::theme::{AccentColor, ThemeManager, ThemeName};
//!
//! let manager = ThemeManager::new();
//! let visuals = manager.visuals_for(ThemeName::Sepia, AccentColor::Green);
//! assert!(!visuals.dark_mode);
//! ```

use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Selectable visual theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Light,
    #[default]
    Dark,
    Sepia,
}

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [Self::Light, Self::Dark, Self::Sepia];

    /// Next theme in the toggle cycle: light, dark, sepia, light, ...
    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Sepia,
            Self::Sepia => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Sepia => "sepia",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::Sepia => "Sepia",
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl From<egui::Theme> for ThemeName {
    fn from(theme: egui::Theme) -> Self {
        match theme {
            egui::Theme::Dark => Self::Dark,
            egui::Theme::Light => Self::Light,
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "sepia" => Ok(Self::Sepia),
            other => Err(format!("Theme '{}' not found", other)),
        }
    }
}

/// Accent color used for selections, links and focused widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    #[default]
    Blue,
    Purple,
    Green,
    Red,
    Orange,
}

impl AccentColor {
    pub const ALL: [AccentColor; 5] =
        [Self::Blue, Self::Purple, Self::Green, Self::Red, Self::Orange];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Green => "green",
            Self::Red => "red",
            Self::Orange => "orange",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Purple => "Purple",
            Self::Green => "Green",
            Self::Red => "Red",
            Self::Orange => "Orange",
        }
    }

    /// Base swatch of the accent.
    pub fn color(self) -> Color32 {
        match self {
            Self::Blue => hex_to_color32("#3b82f6"),
            Self::Purple => hex_to_color32("#8b5cf6"),
            Self::Green => hex_to_color32("#22c55e"),
            Self::Red => hex_to_color32("#ef4444"),
            Self::Orange => hex_to_color32("#f97316"),
        }
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccentColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "blue" => Ok(Self::Blue),
            "purple" => Ok(Self::Purple),
            "green" => Ok(Self::Green),
            "red" => Ok(Self::Red),
            "orange" => Ok(Self::Orange),
            other => Err(format!("Accent color '{}' not found", other)),
        }
    }
}

/// Complete color palette for a theme
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Background colors
    pub background: Color32,
    pub panel_background: Color32,
    pub extreme_background: Color32,

    // Foreground colors
    pub text: Color32,

    // Interactive colors
    pub hover: Color32,
    pub border: Color32,

    // Status colors
    pub error: Color32,
    pub warning: Color32,
}

/// A named color palette
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

/// Centralized theme manager providing access to all available themes
pub struct ThemeManager {
    themes: HashMap<ThemeName, Theme>,
}

impl ThemeManager {
    /// Creates a new ThemeManager initialized with all built-in themes
    pub fn new() -> Self {
        let mut themes = HashMap::new();

        themes.insert(ThemeName::Light, light_theme());
        themes.insert(ThemeName::Dark, dark_theme());
        themes.insert(ThemeName::Sepia, sepia_theme());

        Self { themes }
    }

    /// Retrieves a theme by name
    pub fn get_theme(&self, name: ThemeName) -> Option<&Theme> {
        self.themes.get(&name)
    }

    /// Builds the window visuals for a theme and accent color.
    pub fn visuals_for(&self, name: ThemeName, accent: AccentColor) -> egui::Visuals {
        let mut visuals = if name.is_dark() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };

        if let Some(theme) = self.get_theme(name) {
            self.apply_theme(theme, accent, &mut visuals);
        }
        visuals
    }

    /// Applies a theme's colors and accent to egui visuals
    pub fn apply_theme(&self, theme: &Theme, accent: AccentColor, visuals: &mut egui::Visuals) {
        let colors = &theme.colors;
        let accent_color = accent.color();
        let selection = if theme.name.is_dark() {
            adjust_brightness(accent_color, 0.55)
        } else {
            adjust_brightness(accent_color, 1.6)
        };

        visuals.panel_fill = colors.panel_background;
        visuals.window_fill = colors.background;
        visuals.extreme_bg_color = colors.extreme_background;
        visuals.faint_bg_color = colors.hover;

        visuals.override_text_color = Some(colors.text);

        visuals.selection.bg_fill = selection;
        visuals.selection.stroke.color = accent_color;

        visuals.widgets.noninteractive.bg_fill = colors.panel_background;
        visuals.widgets.noninteractive.bg_stroke.color = colors.border;
        visuals.widgets.inactive.bg_fill = colors.hover;
        visuals.widgets.hovered.bg_fill = colors.hover;
        visuals.widgets.active.bg_fill = selection;

        visuals.hyperlink_color = accent_color;

        visuals.error_fg_color = colors.error;
        visuals.warn_fg_color = colors.warning;
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn light_theme() -> Theme {
    Theme {
        name: ThemeName::Light,
        colors: ThemeColors {
            background: Color32::from_rgb(248, 248, 248),
            panel_background: Color32::from_rgb(248, 248, 248),
            extreme_background: Color32::from_rgb(255, 255, 255),

            text: Color32::from_rgb(20, 20, 20),

            hover: Color32::from_rgb(220, 220, 220),
            border: Color32::from_rgb(160, 160, 160),

            error: Color32::from_rgb(200, 40, 40),
            warning: Color32::from_rgb(230, 120, 20),
        },
    }
}

fn dark_theme() -> Theme {
    Theme {
        name: ThemeName::Dark,
        colors: ThemeColors {
            background: Color32::from_rgb(39, 39, 39),
            panel_background: Color32::from_rgb(39, 39, 39),
            extreme_background: Color32::from_rgb(16, 16, 16),

            text: Color32::from_rgb(235, 235, 235),

            hover: Color32::from_rgb(70, 70, 70),
            border: Color32::from_rgb(100, 100, 100),

            error: Color32::from_rgb(231, 76, 60),
            warning: Color32::from_rgb(243, 156, 18),
        },
    }
}

/// Warm, low-contrast reading theme
fn sepia_theme() -> Theme {
    Theme {
        name: ThemeName::Sepia,
        colors: ThemeColors {
            // Paper: #f4ecd8
            background: hex_to_color32("#f4ecd8"),
            panel_background: hex_to_color32("#f4ecd8"),
            extreme_background: hex_to_color32("#fbf6ea"),

            // Ink: #5b4636
            text: hex_to_color32("#5b4636"),

            hover: hex_to_color32("#e6d9bd"),
            border: hex_to_color32("#c8b48f"),

            error: hex_to_color32("#a8322d"),
            warning: hex_to_color32("#b5651d"),
        },
    }
}

/// Converts a hex color string (like "#282a36") to Color32
pub fn hex_to_color32(hex: &str) -> Color32 {
    let hex = hex.trim_start_matches('#');

    if hex.len() == 6 {
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
        Color32::from_rgb(r, g, b)
    } else {
        Color32::from_rgb(0, 0, 0) // Fallback to black
    }
}

/// Adjusts the brightness of a color by a factor (1.0 = no change, >1.0 = brighter, <1.0 = darker)
pub fn adjust_brightness(color: Color32, factor: f32) -> Color32 {
    let r = (color.r() as f32 * factor).min(255.0) as u8;
    let g = (color.g() as f32 * factor).min(255.0) as u8;
    let b = (color.b() as f32 * factor).min(255.0) as u8;
    Color32::from_rgb(r, g, b)
}

/// Sets the alpha channel of a color
pub fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_premultiplied(color.r(), color.g(), color.b(), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_cycle() {
        let mut theme = ThemeName::Light;
        for _ in 0..3 {
            theme = theme.next();
        }
        assert_eq!(theme, ThemeName::Light);
        assert_eq!(ThemeName::Light.next(), ThemeName::Dark);
        assert_eq!(ThemeName::Dark.next(), ThemeName::Sepia);
    }

    #[test]
    fn test_parse_names() {
        for theme in ThemeName::ALL {
            assert_eq!(theme.as_str().parse::<ThemeName>(), Ok(theme));
        }
        for accent in AccentColor::ALL {
            assert_eq!(accent.as_str().parse::<AccentColor>(), Ok(accent));
        }
        assert!("solarized".parse::<ThemeName>().is_err());
    }

    #[test]
    fn test_visuals_follow_theme() {
        let manager = ThemeManager::new();

        let dark = manager.visuals_for(ThemeName::Dark, AccentColor::Blue);
        assert!(dark.dark_mode);
        assert_eq!(dark.hyperlink_color, AccentColor::Blue.color());

        let sepia = manager.visuals_for(ThemeName::Sepia, AccentColor::Red);
        assert!(!sepia.dark_mode);
        assert_eq!(sepia.panel_fill, hex_to_color32("#f4ecd8"));
        assert_eq!(sepia.selection.stroke.color, AccentColor::Red.color());
    }

    #[test]
    fn test_hex_to_color32() {
        assert_eq!(hex_to_color32("#ff0000"), Color32::from_rgb(255, 0, 0));
        assert_eq!(hex_to_color32("bad"), Color32::from_rgb(0, 0, 0));
    }
}
