use reqlint_deps::{SectionRules, ValidationRules};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the project-local config file
pub const LOCAL_CONFIG_FILE: &str = "reqlint.toml";

/// Main configuration structure
///
/// Lookup order: explicit path (flag or env) > ./reqlint.toml > user config
/// dir > defaults. Every field has a serde default, so partial files work.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub rules: ValidationRules,
    #[serde(default)]
    pub sections: SectionRules,
}

impl Config {
    /// Resolve and load the config; an explicit path must exist
    pub fn load(explicit: Option<&Path>) -> crate::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(user) = Self::user_config_path() {
            if user.exists() {
                return Self::from_file(&user);
            }
        }

        // No config file? Use defaults
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save config to disk
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<config dir>/reqlint/config.toml`, XDG on Linux/macOS, AppData on Windows
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reqlint").join("config.toml"))
    }
}
