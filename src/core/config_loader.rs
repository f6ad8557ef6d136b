// src/core/config_loader.rs

use crate::{
    constants::{
        DEFAULT_FRAME_RATE, DEFAULT_MAX_HISTORY, DEFAULT_START_PATH, DEFAULT_VISIBLE_LINES,
    },
    core::paths::{self, PathError},
    models::StorageKind,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Failures reading, writing or validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write config file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything a session and its host can be tuned with. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path the session starts in.
    pub start_path: String,
    /// Scrollback lines kept before the oldest are evicted.
    pub max_history: usize,
    /// Scrollback lines a display shows per frame.
    pub visible_lines: usize,
    /// Host loop cadence, in frames per second.
    pub frame_rate: u32,
    /// Backend used by `ls` and `cd`.
    pub storage: StorageKind,
    /// Show the welcome banner on start.
    pub welcome: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_path: DEFAULT_START_PATH.to_string(),
            max_history: DEFAULT_MAX_HISTORY,
            visible_lines: DEFAULT_VISIBLE_LINES,
            frame_rate: DEFAULT_FRAME_RATE,
            storage: StorageKind::default(),
            welcome: true,
        }
    }
}

/// Values given on the command line; each one wins over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub start_path: Option<String>,
    pub max_history: Option<usize>,
    pub storage: Option<StorageKind>,
    pub welcome: Option<bool>,
}

impl SessionConfig {
    /// Replaces every field that has an override.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(start_path) = overrides.start_path {
            self.start_path = start_path;
        }
        if let Some(max_history) = overrides.max_history {
            self.max_history = max_history;
        }
        if let Some(storage) = overrides.storage {
            self.storage = storage;
        }
        if let Some(welcome) = overrides.welcome {
            self.welcome = welcome;
        }
    }

    /// Rejects an empty start path and zero limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_path.trim().is_empty() {
            return Err(ConfigError::Invalid("start_path must not be empty".to_string()));
        }
        if self.max_history == 0 {
            return Err(ConfigError::Invalid("max_history must be at least 1".to_string()));
        }
        if self.visible_lines == 0 {
            return Err(ConfigError::Invalid("visible_lines must be at least 1".to_string()));
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::Invalid("frame_rate must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Time between two host frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.frame_rate.max(1)))
    }
}

/// Loads the configuration.
///
/// An explicit path (with `~` and variables expanded) must exist. Without one, the default
/// file in the vshell config directory is used and written out with defaults the first time.
pub fn load_config(explicit: Option<&str>) -> Result<SessionConfig, ConfigError> {
    let config = match explicit {
        Some(raw) => {
            let path = paths::expand_user_path(raw)?;
            log::debug!("Loading config from explicit path '{}'", path.display());
            load_from_file(&path)?
        }
        None => {
            let path = paths::get_default_config_path()?;
            if path.exists() {
                log::debug!("Loading config from '{}'", path.display());
                load_from_file(&path)?
            } else {
                let config = SessionConfig::default();
                write_config(&path, &config)?;
                log::info!(
                    "{}",
                    format!(t!("host.info.config_created"), path = path.display())
                );
                config
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Reads and parses one config file.
pub fn load_from_file(path: &Path) -> Result<SessionConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_config(&content, path)
}

fn parse_config(content: &str, origin: &Path) -> Result<SessionConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: origin.display().to_string(),
        source: e,
    })
}

/// Writes `config` as pretty TOML.
pub fn write_config(path: &Path, config: &SessionConfig) -> Result<(), ConfigError> {
    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string).map_err(|e| ConfigError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_takes_defaults() {
        let config = parse_config("max_history = 5\nstorage = \"os\"\n", Path::new("inline")).unwrap();
        assert_eq!(config.max_history, 5);
        assert_eq!(config.storage, StorageKind::Os);
        assert_eq!(config.start_path, DEFAULT_START_PATH);
        assert_eq!(config.frame_rate, DEFAULT_FRAME_RATE);
        assert!(config.welcome);
    }

    #[test]
    fn test_backslash_paths_survive_toml() {
        let config =
            parse_config("start_path = 'C:\\Users\\guest'\n", Path::new("inline")).unwrap();
        assert_eq!(config.start_path, "C:\\Users\\guest");
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let result = parse_config("max_history = \"many\"", Path::new("broken.toml"));
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, "broken.toml"),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_then_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = SessionConfig {
            max_history: 42,
            welcome: false,
            ..SessionConfig::default()
        };
        write_config(&path, &config).unwrap();
        assert_eq!(load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let raw = missing.to_string_lossy().into_owned();
        let result = load_config(Some(raw.as_str()));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let mut config = SessionConfig::default();
        assert!(config.validate().is_ok());

        config.max_history = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config = SessionConfig {
            frame_rate: 0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = SessionConfig::default();
        config.apply(ConfigOverrides {
            start_path: Some("C:\\".to_string()),
            max_history: Some(7),
            storage: None,
            welcome: Some(false),
        });
        assert_eq!(config.start_path, "C:\\");
        assert_eq!(config.max_history, 7);
        assert_eq!(config.storage, StorageKind::Memory);
        assert!(!config.welcome);
    }

    #[test]
    fn test_frame_interval_from_rate() {
        let config = SessionConfig::default();
        assert_eq!(config.frame_interval(), Duration::from_millis(33));
    }
}
