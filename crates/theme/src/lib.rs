//! Color themes for quill.
//!
//! A theme is twelve named colors. User themes live in a single record
//! file looked up by name; the built-in theme is the fallback when the
//! file or the name is missing.

mod loader;

pub use loader::{lookup, COLOR_FIELD_LEN, COLOR_SLOTS, RECORD_LEN, THEME_NAME_LEN};

use crossterm::style::Color;

/// Editor color palette with semantic slot names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Theme name for display and lookup
    pub name: String,

    /// Main background
    pub bg0: Color,
    /// Cursor-line background
    pub bg1: Color,
    /// Gutter and filler foreground
    pub bg2: Color,
    /// Main text
    pub fg0: Color,
    /// Secondary text
    pub grey: Color,

    // Accents, also used by the highlight pass
    pub yellow: Color,
    pub blue: Color,
    pub red: Color,
    pub green: Color,
    pub orange: Color,
    pub aqua: Color,
    pub purple: Color,
}

impl Theme {
    /// Hardcoded built-in theme (gruvbox), used when no theme file is
    /// present or a lookup misses.
    pub fn builtin() -> Self {
        Self {
            name: "gruvbox".to_string(),
            bg0: Color::Rgb {
                r: 40,
                g: 40,
                b: 40,
            },
            bg1: Color::Rgb {
                r: 60,
                g: 56,
                b: 54,
            },
            bg2: Color::Rgb {
                r: 80,
                g: 73,
                b: 69,
            },
            fg0: Color::Rgb {
                r: 235,
                g: 219,
                b: 178,
            },
            grey: Color::Rgb {
                r: 146,
                g: 131,
                b: 116,
            },
            yellow: Color::Rgb {
                r: 215,
                g: 153,
                b: 33,
            },
            blue: Color::Rgb {
                r: 69,
                g: 133,
                b: 136,
            },
            red: Color::Rgb {
                r: 204,
                g: 36,
                b: 29,
            },
            green: Color::Rgb {
                r: 152,
                g: 151,
                b: 26,
            },
            orange: Color::Rgb {
                r: 214,
                g: 93,
                b: 14,
            },
            aqua: Color::Rgb {
                r: 104,
                g: 157,
                b: 106,
            },
            purple: Color::Rgb {
                r: 177,
                g: 98,
                b: 134,
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin()
    }
}
