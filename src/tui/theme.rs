//! Theme system for the chat window
//!
//! Provides color schemes for the header, bubbles, disclosures and input.
//! Add a preset by extending `ThemePreset` and `Theme::from_preset`.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Built-in color schemes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ThemePreset {
    #[default]
    CatppuccinMocha,
    Nord,
    Dracula,
}

impl ThemePreset {
    pub fn display_name(&self) -> &'static str {
        match self {
            ThemePreset::CatppuccinMocha => "Catppuccin Mocha",
            ThemePreset::Nord => "Nord",
            ThemePreset::Dracula => "Dracula",
        }
    }
}

/// Theme colors for the chat window
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg_main: Color,
    pub bg_header: Color,
    pub bg_code: Color,

    // Border colors
    pub border: Color,
    pub border_focused: Color,

    // Text colors
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    // Accent colors
    pub cyan: Color,
    pub green: Color,
    pub red: Color,

    // Message colors
    pub own_bubble: Color,
    pub other_bubble: Color,
    pub reasoning_fg: Color,

    // Bubble backgrounds
    pub own_bubble_bg: Color,
    pub other_bubble_bg: Color,
    pub selected_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

impl Theme {
    /// Catppuccin Mocha theme (default)
    pub fn catppuccin_mocha() -> Self {
        Self {
            bg_main: Color::Rgb(30, 30, 46),
            bg_header: Color::Rgb(24, 24, 37),
            bg_code: Color::Rgb(49, 50, 68),

            border: Color::Rgb(49, 50, 68),
            border_focused: Color::Rgb(137, 180, 250),

            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(166, 173, 200),
            text_muted: Color::Rgb(108, 112, 134),

            cyan: Color::Rgb(148, 226, 213),
            green: Color::Rgb(166, 227, 161),
            red: Color::Rgb(243, 139, 168),

            own_bubble: Color::Rgb(137, 180, 250),
            other_bubble: Color::Rgb(166, 227, 161),
            reasoning_fg: Color::Rgb(249, 226, 175),

            // blue-tinted for own, green-tinted for others
            own_bubble_bg: Color::Rgb(35, 40, 60),
            other_bubble_bg: Color::Rgb(35, 50, 45),
            selected_bg: Color::Rgb(42, 43, 55),
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            bg_main: Color::Rgb(46, 52, 64),   // nord0
            bg_header: Color::Rgb(40, 44, 52), // darker variant
            bg_code: Color::Rgb(59, 66, 82),   // nord1

            border: Color::Rgb(76, 86, 106),           // nord3
            border_focused: Color::Rgb(136, 192, 208), // nord8

            text_primary: Color::Rgb(236, 239, 244),   // nord6
            text_secondary: Color::Rgb(229, 233, 240), // nord5
            text_muted: Color::Rgb(143, 157, 179),     // nord4

            cyan: Color::Rgb(136, 192, 208),   // nord8
            green: Color::Rgb(163, 190, 140),  // nord14
            red: Color::Rgb(191, 97, 106),     // nord11

            own_bubble: Color::Rgb(129, 161, 193),
            other_bubble: Color::Rgb(163, 190, 140),
            reasoning_fg: Color::Rgb(235, 203, 139),

            own_bubble_bg: Color::Rgb(46, 55, 70),
            other_bubble_bg: Color::Rgb(50, 60, 55),
            selected_bg: Color::Rgb(55, 62, 75),
        }
    }

    /// Dracula theme
    pub fn dracula() -> Self {
        Self {
            bg_main: Color::Rgb(40, 42, 54),   // background
            bg_header: Color::Rgb(33, 34, 44), // darker variant
            bg_code: Color::Rgb(68, 71, 90),   // current line

            border: Color::Rgb(68, 71, 90),
            border_focused: Color::Rgb(189, 147, 249), // purple

            text_primary: Color::Rgb(248, 248, 242),   // foreground
            text_secondary: Color::Rgb(241, 250, 140), // yellow
            text_muted: Color::Rgb(98, 114, 164),      // comment

            cyan: Color::Rgb(139, 233, 253),
            green: Color::Rgb(80, 250, 123),
            red: Color::Rgb(255, 85, 85),

            own_bubble: Color::Rgb(189, 147, 249),
            other_bubble: Color::Rgb(80, 250, 123),
            reasoning_fg: Color::Rgb(241, 250, 140),

            own_bubble_bg: Color::Rgb(55, 45, 70),
            other_bubble_bg: Color::Rgb(40, 55, 45),
            selected_bg: Color::Rgb(55, 55, 65),
        }
    }

    /// Get theme from preset
    pub fn from_preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::CatppuccinMocha => Self::catppuccin_mocha(),
            ThemePreset::Nord => Self::nord(),
            ThemePreset::Dracula => Self::dracula(),
        }
    }
}
