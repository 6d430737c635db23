//! Configuration file discovery and loading

use std::path::{Path, PathBuf};

use super::EngineConfig;
use crate::error::SpliceError;
use crate::result::Result;

/// File names searched for, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &["splice.toml", ".splice.toml", "splice.json"];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Find the nearest config file, walking up from `start_path` until the
    /// filesystem root
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| SpliceError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load a TOML (`.toml`) or JSON (`.json`) config file
    pub fn load_from_file(path: &Path) -> Result<EngineConfig> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SpliceError::io_error(path, e))?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(SpliceError::config_error(
                "Unsupported file extension (expected .toml or .json)",
            )),
        };
        config.map_err(|e| match e {
            SpliceError::ConfigError { message } => SpliceError::config_error(format!(
                "Failed to load config from '{}': {message}",
                path.display()
            )),
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<EngineConfig> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| SpliceError::config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<EngineConfig> {
        let config: EngineConfig =
            serde_json::from_str(content).map_err(|e| SpliceError::config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, else the discovered one, else defaults
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<EngineConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(SpliceError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(EngineConfig::default())
            }
        }
    }
}
