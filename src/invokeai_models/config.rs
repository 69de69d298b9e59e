use crate::error::{ModelsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

pub const DEFAULT_MAX_SNAPSHOTS: usize = 5;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Configuration for invokeai-models, stored in config.json and overridable
/// through `INVOKEAI_*` environment variables.
///
/// Built once at process start and passed into every component constructor;
/// there is no ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Root of the InvokeAI install (the database lives under it)
    #[serde(default)]
    pub install_dir: PathBuf,

    /// Directory holding the `checkpoints/` and `loras/` subtrees
    #[serde(default)]
    pub models_dir: PathBuf,

    /// Where snapshot copies, snapshot metadata, and cache files live
    #[serde(default)]
    pub snapshots_dir: PathBuf,

    /// Upper bound on the rotating snapshot list
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,

    /// Age after which cached listings are discarded
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Store `format` values eligible for reconciliation
    #[serde(default = "default_relevant_formats")]
    pub relevant_formats: Vec<String>,
}

fn default_max_snapshots() -> usize {
    DEFAULT_MAX_SNAPSHOTS
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_relevant_formats() -> Vec<String> {
    vec!["lora".to_string(), "checkpoint".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::new(),
            models_dir: PathBuf::new(),
            snapshots_dir: PathBuf::new(),
            max_snapshots: DEFAULT_MAX_SNAPSHOTS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            relevant_formats: default_relevant_formats(),
        }
    }
}

impl AppConfig {
    /// Load config from the given directory, apply environment overrides,
    /// and fill in the default snapshots location.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(ModelsError::Io)?;
            serde_json::from_str(&content).map_err(ModelsError::Serialization)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        if config.snapshots_dir.as_os_str().is_empty() {
            config.snapshots_dir = config_dir.join("snapshots");
        }

        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(ModelsError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(ModelsError::Serialization)?;
        fs::write(config_path, content).map_err(ModelsError::Io)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("INVOKEAI_DIR") {
            self.install_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("INVOKEAI_MODELS_DIR") {
            self.models_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("INVOKEAI_SNAPSHOTS_DIR") {
            self.snapshots_dir = PathBuf::from(dir);
        }
        if let Ok(max) = std::env::var("INVOKEAI_MAX_SNAPSHOTS") {
            if let Ok(max) = max.parse() {
                self.max_snapshots = max;
            }
        }
        if let Ok(ttl) = std::env::var("INVOKEAI_CACHE_TTL_SECS") {
            if let Ok(ttl) = ttl.parse() {
                self.cache_ttl_secs = ttl;
            }
        }
    }

    /// Required settings must be present before any core logic runs.
    pub fn validate(&self) -> Result<()> {
        if self.install_dir.as_os_str().is_empty() {
            return Err(ModelsError::Config(
                "install_dir is not set (config.json install_dir or INVOKEAI_DIR)".to_string(),
            ));
        }
        if self.models_dir.as_os_str().is_empty() {
            return Err(ModelsError::Config(
                "models_dir is not set (config.json models_dir or INVOKEAI_MODELS_DIR)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.install_dir.join("databases").join("invokeai.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_snapshots, 5);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.relevant_formats, vec!["lora", "checkpoint"]);
    }

    #[test]
    fn test_validate_rejects_missing_dirs() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());

        let config = AppConfig {
            install_dir: PathBuf::from("/opt/invokeai"),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            install_dir: PathBuf::from("/opt/invokeai"),
            models_dir: PathBuf::from("/opt/invokeai/models"),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_path_is_derived_from_install_dir() {
        let config = AppConfig {
            install_dir: PathBuf::from("/opt/invokeai"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/opt/invokeai/databases/invokeai.db")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();

        let config = AppConfig {
            install_dir: PathBuf::from("/opt/invokeai"),
            models_dir: PathBuf::from("/data/models"),
            max_snapshots: 9,
            ..AppConfig::default()
        };
        config.save(dir.path()).unwrap();

        let loaded = AppConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.install_dir, PathBuf::from("/opt/invokeai"));
        assert_eq!(loaded.max_snapshots, 9);
        // unset snapshots_dir falls back beneath the config dir
        assert_eq!(loaded.snapshots_dir, dir.path().join("snapshots"));
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let loaded = AppConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.max_snapshots, DEFAULT_MAX_SNAPSHOTS);
    }
}
