use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Coordinate;

/// Top-level configuration stored on disk.
///
/// The API key lives here rather than in the source so a shipped build
/// never embeds the credential.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// weatherapi.com API key.
    pub api_key: Option<String>,

    /// Optional pinned coordinate, used when no location capability is
    /// available on this machine.
    ///
    /// Example TOML:
    /// [pinned]
    /// lat = 37.7749
    /// lon = -122.4194
    pub pinned: Option<Coordinate>,
}

impl Config {
    /// The configured API key, or an actionable error.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `skycast configure` and enter your weatherapi.com key."
            )
        })
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("Hint: run `skycast configure`"));
    }

    #[test]
    fn require_api_key_returns_the_key() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        assert_eq!(cfg.require_api_key().expect("key set"), "KEY");
    }

    #[test]
    fn toml_round_trip() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            pinned: Some(Coordinate { lat: 37.7749, lon: -122.4194 }),
        };

        let serialized = toml::to_string_pretty(&cfg).expect("serialize");
        let reparsed: Config = toml::from_str(&serialized).expect("parse");

        assert_eq!(reparsed.api_key.as_deref(), Some("KEY"));
        let pinned = reparsed.pinned.expect("pinned present");
        assert_eq!(pinned.lat, 37.7749);
        assert_eq!(pinned.lon, -122.4194);
    }

    #[test]
    fn empty_file_parses_to_defaults() {
        let cfg: Config = toml::from_str("").expect("parse");
        assert!(cfg.api_key.is_none());
        assert!(cfg.pinned.is_none());
    }
}
