use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::terrain::terrain_config::{ConfigError, TerrainConfig};

/// Failure to read, parse, write or accept a configuration file.
#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("could not access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML config: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("could not serialize config as TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rejected config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, everything else is read as TOML.
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Owns the active terrain configuration and the file it came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    current_config: TerrainConfig,
    config_path: Option<PathBuf>,
}

impl ConfigurationManager {
    pub fn with_config(config: TerrainConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            current_config: config,
            config_path,
        }
    }

    // Missing keys fall back to their defaults; the result must validate.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)?;

        let config: TerrainConfig = match ConfigFormat::from_path(path) {
            ConfigFormat::Toml => toml::from_str(&config_str)?,
            ConfigFormat::Json => serde_json::from_str(&config_str)?,
        };
        if let Err(e) = config.validate() {
            warn!("ConfigurationManager: Rejected {}: {}", path.display(), e);
            return Err(e.into());
        }

        info!("ConfigurationManager: Loaded {}", path.display());
        Ok(Self {
            current_config: config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Write the current configuration back to its path. Does nothing when
    /// no path is set.
    pub fn save_to_file(&self) -> Result<(), ConfigFileError> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        let serialized = match ConfigFormat::from_path(path) {
            ConfigFormat::Toml => toml::to_string_pretty(&self.current_config)?,
            ConfigFormat::Json => serde_json::to_string_pretty(&self.current_config)?,
        };
        fs::write(path, serialized)?;
        info!("ConfigurationManager: Saved {}", path.display());
        Ok(())
    }

    pub fn set_config_path<P: AsRef<Path>>(&mut self, path: P) {
        self.config_path = Some(path.as_ref().to_path_buf());
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Replace the configuration. Invalid configurations are refused and
    /// the previous one stays active.
    pub fn update_config(&mut self, updates: TerrainConfig) -> Result<(), ConfigError> {
        updates.validate()?;
        self.current_config = updates;
        Ok(())
    }

    pub fn get_config(&self) -> &TerrainConfig {
        &self.current_config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.current_config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ring_terrain_{}_{}", std::process::id(), name))
    }

    #[test]
    fn toml_round_trip_through_disk() {
        let path = scratch_path("round_trip.toml");
        let config = TerrainConfig {
            seed: 17,
            speed: 0.25,
            ..TerrainConfig::rugged_preset()
        };
        ConfigurationManager::with_config(config.clone(), Some(path.clone()))
            .save_to_file()
            .unwrap();

        let loaded = ConfigurationManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.get_config(), &config);
        assert_eq!(loaded.config_path(), Some(path.as_path()));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn json_is_picked_by_extension() {
        let path = scratch_path("partial.json");
        fs::write(&path, r#"{ "seed": 8, "noise_type": "perlin" }"#).unwrap();

        let loaded = ConfigurationManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.get_config().seed, 8);
        assert_eq!(loaded.get_config().chunk_width, TerrainConfig::default().chunk_width);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let path = scratch_path("partial.toml");
        fs::write(&path, "ring_radius = 500.0\n\n[growth_boundaries]\nflora_near = 100.0\n").unwrap();

        let config = ConfigurationManager::load_from_file(&path).unwrap().get_config().clone();
        assert_eq!(config.ring_radius, 500.0);
        assert_eq!(config.growth_boundaries.flora_near, 100.0);
        assert_eq!(config.growth_boundaries.flora_far, 350.0);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn invalid_file_contents_are_rejected() {
        let path = scratch_path("invalid.toml");
        fs::write(&path, "resolution = 0\n").unwrap();
        assert!(matches!(
            ConfigurationManager::load_from_file(&path),
            Err(ConfigFileError::Config(ConfigError::ZeroResolution))
        ));

        fs::write(&path, "seed = \"three\"\n").unwrap();
        assert!(matches!(
            ConfigurationManager::load_from_file(&path),
            Err(ConfigFileError::TomlDe(_))
        ));
        fs::remove_file(&path).ok();

        assert!(matches!(
            ConfigurationManager::load_from_file(scratch_path("missing.toml")),
            Err(ConfigFileError::Io(_))
        ));
    }

    #[test]
    fn update_config_keeps_previous_on_error() {
        let mut manager = ConfigurationManager::default();
        let bad = TerrainConfig {
            target_chunk_count: 0,
            ..TerrainConfig::default()
        };
        assert_eq!(manager.update_config(bad), Err(ConfigError::ZeroTargetChunkCount));
        assert_eq!(manager.get_config(), &TerrainConfig::default());
        assert!(manager.save_to_file().is_ok());
    }
}
