use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;
use crate::game::Difficulty;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "CONCENTRATION_CONFIG";

/// Game tunables, loadable from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// How long both faces of a pair stay visible before it is evaluated.
    pub match_delay_ms: u64,
    pub tick_ms: u64,
    /// Overrides the records file location.
    pub records_path: Option<PathBuf>,
    /// Preselected board in the menu.
    pub default_difficulty: Option<Difficulty>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            match_delay_ms: 1000,
            tick_ms: 1000,
            records_path: None,
            default_difficulty: None,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Reads the file named by `CONCENTRATION_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load_or_default(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.match_delay_ms == 0 {
            return Err(ConfigError::Validation("match_delay_ms must be > 0".into()));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Validation("tick_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn match_delay(&self) -> Duration {
        Duration::from_millis(self.match_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
