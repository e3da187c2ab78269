//! Configuration for gameterm.
//!
//! Loaded from `~/.gameterm/config.toml`. Every section is optional and a
//! missing or unreadable file falls back to the defaults.
//!
//! ```toml
//! # Log filter (overridden by RUST_LOG)
//! log_level = "info"
//!
//! [menu]
//! # SGR color code for the highlighted option (96 = bright cyan)
//! highlight = 96
//! orientation = "vertical"
//!
//! [colors]
//! accent = { r = 119, g = 110, b = 101 }
//! background = { r = 187, g = 173, b = 160 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::Rgb;
use crate::ui::{Orientation, DEFAULT_HIGHLIGHT};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter directive
    pub log_level: String,
    /// Selection menu settings
    pub menu: MenuConfig,
    /// Truecolor palette
    pub colors: ColorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            menu: MenuConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

/// Selection menu configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub highlight: u8,
    pub orientation: Orientation,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            highlight: DEFAULT_HIGHLIGHT,
            orientation: Orientation::Vertical,
        }
    }
}

/// Color configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub accent: Rgb,
    pub background: Rgb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            accent: Rgb::from_packed(0x776E65),
            background: Rgb::from_packed(0xBBADA0),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    /// Load from an explicit file, falling back to defaults if it cannot be read.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse TOML, falling back to defaults on error.
    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_else(|e| {
            warn!("Invalid config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), String> {
        let path = Self::get_config_path().ok_or("Could not determine config path")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Directory holding the config file and log.
    pub fn config_dir() -> Option<PathBuf> {
        let dir = home_dir()?.join(".gameterm");
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir)
    }

    fn get_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [menu]
            orientation = "horizontal"

            [colors]
            accent = { r = 1, g = 2, b = 3 }
            "#,
        );
        assert_eq!(config.menu.orientation, Orientation::Horizontal);
        assert_eq!(config.menu.highlight, DEFAULT_HIGHLIGHT);
        assert_eq!(config.colors.accent, Rgb::new(1, 2, 3));
        assert_eq!(config.colors.background, Rgb::new(187, 173, 160));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_config_falls_back() {
        assert_eq!(Config::parse("menu = 3"), Config::default());
    }

    #[test]
    fn test_serialized_config_parses_back() {
        let mut config = Config::default();
        config.menu.highlight = 91;
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text), config);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("gameterm-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.log_level = "debug".to_string();
        config.menu.orientation = Orientation::Horizontal;
        config.colors.accent = Rgb::new(9, 8, 7);

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("gameterm-no-such-dir").join("config.toml");
        assert_eq!(Config::load_from(&path), Config::default());
        assert!(Config::default().save_to(&path).is_err());
    }
}
