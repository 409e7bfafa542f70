//! Configuration management for quill.
//!
//! TOML configuration loading and saving, with missing keys completed from
//! defaults and a config file created on first run.

mod settings;

pub use settings::{Config, EditorSettings, GeneralSettings, LoggingSettings};

use anyhow::Result;
use std::path::PathBuf;

/// Default values as constants
pub mod defaults {
    pub const THEME_NAME: &str = "gruvbox";
    pub const TAB_SIZE: usize = 4;
    pub const USE_CRLF: bool = false;
    pub const MATCH_PAREN: bool = true;
    pub const SYNTAX_ENABLED: bool = true;
    pub const SCROLL_MARGIN: usize = 5;
    pub const MIN_LOG_LEVEL: &str = "info";
}

/// Get the quill config directory.
pub fn get_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(base.join("quill"))
}

impl Config {
    /// Load configuration from file.
    ///
    /// On first run, creates the config file with default values.
    /// Missing keys are auto-completed with defaults and written back.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if config_path.exists() {
            let original_content = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&original_content)?;

            // Serialize back to get normalized content
            let normalized_content = toml::to_string_pretty(&config)?;
            if original_content != normalized_content {
                config.save()?;
            }

            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Path to the theme record file.
    pub fn theme_file_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("themes.dat"))
    }

    /// Path to the user syntax definition file.
    pub fn syntax_file_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("syntax.def"))
    }

    /// Default log file path, used when `logging.file_path` is unset.
    pub fn default_log_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("quill.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.theme, "gruvbox");
        assert_eq!(config.editor.tab_size, 4);
        assert!(!config.editor.use_crlf);
        assert!(config.editor.match_paren);
        assert!(config.editor.syntax_enabled);
        assert_eq!(config.editor.scroll_margin, 5);
        assert_eq!(config.logging.min_level, "info");
    }

    #[test]
    fn test_partial_toml_completes_with_defaults() {
        let config: Config = toml::from_str("[editor]\ntab_size = 8\n").unwrap();
        assert_eq!(config.editor.tab_size, 8);
        assert!(config.editor.match_paren);
        assert_eq!(config.general.theme, "gruvbox");
    }

    #[test]
    fn test_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let reparsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(reparsed.editor.tab_size, config.editor.tab_size);
        assert_eq!(reparsed.general.theme, config.general.theme);
    }
}
