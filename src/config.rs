//! Configuration for exports: author record and output settings

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::render::geometry::POINTS_PER_INCH;

/// Author and contact printed on the parameter page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
}

impl Default for AuthorInfo {
    fn default() -> Self {
        Self {
            name: "Valentýna Čížová".to_string(),
            email: "277735@vutbr.cz".to_string(),
        }
    }
}

/// Layout and resolution settings for preview and PDF output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Font size of the parameter page, in points
    pub text_font_size: f32,
    /// Preview raster resolution in dots per inch
    pub preview_dpi: f32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            text_font_size: 11.0,
            preview_dpi: 100.0,
        }
    }
}

impl ExportSettings {
    /// Preview pixels per figure point
    pub fn preview_scale(&self) -> f32 {
        self.preview_dpi / POINTS_PER_INCH
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KruzniceConfig {
    pub author: AuthorInfo,
    pub export: ExportSettings,
}

impl KruzniceConfig {
    /// Configuration directory name under the user config dir
    pub const ID: &'static str = "kruznice";

    /// Default location: `<config_dir>/kruznice/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                log::warn!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load `path`, falling back to defaults if it is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) {
        match Self::default_path() {
            Some(path) => {
                if let Err(err) = self.save_to(&path) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            None => log::error!("No config directory on this platform, config not saved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = KruzniceConfig {
            author: AuthorInfo {
                name: "Test Author".to_string(),
                email: "test@example.com".to_string(),
            },
            export: ExportSettings {
                text_font_size: 9.5,
                preview_dpi: 144.0,
            },
        };
        config.save_to(&path).unwrap();
        assert_eq!(KruzniceConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"export": {"preview_dpi": 200.0}}"#).unwrap();
        let config = KruzniceConfig::load_from(&path).unwrap();
        assert_eq!(config.author, AuthorInfo::default());
        assert_eq!(config.export.text_font_size, 11.0);
        assert_eq!(config.export.preview_dpi, 200.0);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = KruzniceConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert!(KruzniceConfig::load_from(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(KruzniceConfig::load_or_default(&path), KruzniceConfig::default());

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(KruzniceConfig::load_or_default(&path), KruzniceConfig::default());

        let config = KruzniceConfig {
            author: AuthorInfo {
                name: "Michał".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(KruzniceConfig::load_or_default(&path), config);
    }

    #[test]
    fn test_default_path_ends_with_id() {
        if let Some(path) = KruzniceConfig::default_path() {
            assert!(path.ends_with("kruznice/config.json"));
        }
    }

    #[test]
    fn test_preview_scale() {
        let settings = ExportSettings {
            preview_dpi: 144.0,
            ..Default::default()
        };
        assert_eq!(settings.preview_scale(), 2.0);
    }
}
