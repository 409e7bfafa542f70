//! Configuration structures for quill settings.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General application settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Editor settings
    #[serde(default)]
    pub editor: EditorSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Selected theme name
    #[serde(default = "default_theme_name")]
    pub theme: String,
}

/// Editor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Tab size (number of spaces)
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,

    /// Terminate saved lines with CRLF instead of LF
    #[serde(default = "default_use_crlf")]
    pub use_crlf: bool,

    /// Auto-close and type-over matching brackets and quotes
    #[serde(default = "default_match_paren")]
    pub match_paren: bool,

    /// Enable keyword syntax highlighting
    #[serde(default = "default_syntax_enabled")]
    pub syntax_enabled: bool,

    /// Minimum distance kept between cursor and viewport edge
    #[serde(default = "default_scroll_margin")]
    pub scroll_margin: usize,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional; defaults next to the config file)
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,
}

// Default value functions for serde
fn default_theme_name() -> String {
    defaults::THEME_NAME.to_string()
}

fn default_tab_size() -> usize {
    defaults::TAB_SIZE
}

fn default_use_crlf() -> bool {
    defaults::USE_CRLF
}

fn default_match_paren() -> bool {
    defaults::MATCH_PAREN
}

fn default_syntax_enabled() -> bool {
    defaults::SYNTAX_ENABLED
}

fn default_scroll_margin() -> usize {
    defaults::SCROLL_MARGIN
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

// Default implementations
impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            theme: default_theme_name(),
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_size: default_tab_size(),
            use_crlf: default_use_crlf(),
            match_paren: default_match_paren(),
            syntax_enabled: default_syntax_enabled(),
            scroll_margin: default_scroll_margin(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
        }
    }
}
