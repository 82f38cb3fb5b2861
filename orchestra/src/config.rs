//! Configuration management for Orchestra
//!
//! Values are resolved from defaults, then an optional YAML file, then
//! `ORCHESTRA_*` environment variables, each layer overriding the previous.

use crate::process::{ContextFactory, ProcessIdGenerator, UlidGenerator, UuidGenerator};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

const CONFIG_DIR_NAME: &str = ".orchestra";
const CONFIG_FILE_NAME: &str = "config.yaml";
const ENV_PREFIX: &str = "ORCHESTRA";

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path to the configuration file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content from a configuration file
    #[error("Invalid YAML syntax in {path}:\n{source}\n\nHint: Check for proper indentation and YAML formatting")]
    YamlParse {
        /// Path to the configuration file with invalid YAML content
        path: PathBuf,
        /// Underlying YAML parsing error
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid configuration value for a specific field
    #[error("Invalid configuration value for '{field}': {value}\n{hint}")]
    InvalidValue {
        /// Name of the configuration field
        field: String,
        /// The invalid value that was provided
        value: String,
        /// How to fix it
        hint: String,
    },
}

/// Which generator produces process ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdGeneratorKind {
    /// Sortable ULIDs
    #[default]
    Ulid,
    /// Random UUID v4
    Uuid,
}

impl FromStr for IdGeneratorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ulid" => Ok(IdGeneratorKind::Ulid),
            "uuid" => Ok(IdGeneratorKind::Uuid),
            _ => Err(ConfigError::InvalidValue {
                field: "id_generator".to_string(),
                value: s.to_string(),
                hint: "Expected one of: ulid, uuid".to_string(),
            }),
        }
    }
}

/// Configuration settings for Orchestra
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestraConfig {
    /// Directory holding persisted process contexts (default: ".orchestra")
    pub storage_dir: PathBuf,
    /// Process id generator (default: ulid)
    pub id_generator: IdGeneratorKind,
    /// Also log every saved context (default: true)
    pub log_contexts: bool,
}

impl Default for OrchestraConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(CONFIG_DIR_NAME),
            id_generator: IdGeneratorKind::default(),
            log_contexts: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    storage_dir: Option<PathBuf>,
    id_generator: Option<String>,
    log_contexts: Option<bool>,
}

impl OrchestraConfig {
    /// Load configuration, searching for a YAML file in the usual locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::find_yaml_config_file().as_deref())
    }

    /// Load configuration from an explicit YAML file, if any
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = path {
            config.apply_yaml_file(path)?;
            tracing::debug!(path = %path.display(), "Loaded configuration file");
        }

        config.apply_env_vars()?;
        Ok(config)
    }

    /// Find the configuration file
    ///
    /// Search order:
    /// 1. `.orchestra/config.yaml` in the current directory
    /// 2. `~/.config/orchestra/config.yaml`
    pub fn find_yaml_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)];
        if let Some(home_dir) = dirs::home_dir() {
            search_paths.push(
                home_dir
                    .join(".config")
                    .join("orchestra")
                    .join(CONFIG_FILE_NAME),
            );
        }

        search_paths.into_iter().find(|path| path.is_file())
    }

    fn apply_yaml_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let yaml: YamlConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(storage_dir) = yaml.storage_dir {
            self.storage_dir = storage_dir;
        }
        if let Some(id_generator) = yaml.id_generator {
            self.id_generator = id_generator.parse()?;
        }
        if let Some(log_contexts) = yaml.log_contexts {
            self.log_contexts = log_contexts;
        }
        Ok(())
    }

    fn apply_env_vars(&mut self) -> Result<(), ConfigError> {
        let loader = EnvLoader::new(ENV_PREFIX);

        if let Some(storage_dir) = loader.load_string("STORAGE_DIR") {
            self.storage_dir = PathBuf::from(storage_dir);
        }
        if let Some(id_generator) = loader.load_string("ID_GENERATOR") {
            self.id_generator = id_generator.parse()?;
        }
        if let Some(log_contexts) = loader.load_string("LOG_CONTEXTS") {
            self.log_contexts = log_contexts.parse().map_err(|_| ConfigError::InvalidValue {
                field: "log_contexts".to_string(),
                value: log_contexts.clone(),
                hint: "Expected true or false".to_string(),
            })?;
        }
        Ok(())
    }

    /// Generator selected by [`OrchestraConfig::id_generator`]
    pub fn process_id_generator(&self) -> Arc<dyn ProcessIdGenerator> {
        match self.id_generator {
            IdGeneratorKind::Ulid => Arc::new(UlidGenerator),
            IdGeneratorKind::Uuid => Arc::new(UuidGenerator),
        }
    }

    /// Context factory using the configured generator
    pub fn context_factory(&self) -> ContextFactory {
        ContextFactory::new(self.process_id_generator())
    }

    /// Example configuration file content
    pub fn example_yaml_config() -> &'static str {
        r#"# .orchestra/config.yaml

# Directory where process execution contexts are stored
storage_dir: ".orchestra"

# Process id format: ulid or uuid
id_generator: "ulid"

# Log every saved process context
log_contexts: true
"#
    }
}

/// Loads environment variables sharing a prefix
#[derive(Debug)]
struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn load_string(&self, suffix: &str) -> Option<String> {
        std::env::var(format!("{}_{}", self.prefix, suffix))
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            "ORCHESTRA_STORAGE_DIR",
            "ORCHESTRA_ID_GENERATOR",
            "ORCHESTRA_LOG_CONTEXTS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = OrchestraConfig::load_from(None).unwrap();
        assert_eq!(config, OrchestraConfig::default());
        assert_eq!(config.storage_dir, PathBuf::from(".orchestra"));
        assert_eq!(config.id_generator, IdGeneratorKind::Ulid);
        assert!(config.log_contexts);
    }

    #[test]
    #[serial]
    fn test_yaml_overrides_defaults() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "storage_dir: /tmp/processes\nid_generator: uuid\nlog_contexts: false\n",
        )
        .unwrap();

        let config = OrchestraConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/processes"));
        assert_eq!(config.id_generator, IdGeneratorKind::Uuid);
        assert!(!config.log_contexts);
    }

    #[test]
    #[serial]
    fn test_env_overrides_yaml() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "id_generator: uuid\n").unwrap();

        env::set_var("ORCHESTRA_ID_GENERATOR", "ULID");
        env::set_var("ORCHESTRA_STORAGE_DIR", "/var/lib/orchestra");
        let config = OrchestraConfig::load_from(Some(&path));
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.id_generator, IdGeneratorKind::Ulid);
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/orchestra"));
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_reported() {
        clear_env();
        env::set_var("ORCHESTRA_LOG_CONTEXTS", "sometimes");
        let result = OrchestraConfig::load_from(None);
        clear_env();

        match result {
            Err(ConfigError::InvalidValue { field, value, .. }) => {
                assert_eq!(field, "log_contexts");
                assert_eq!(value, "sometimes");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_unknown_yaml_keys_are_rejected() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "storage: somewhere\n").unwrap();

        let error = OrchestraConfig::load_from(Some(&path)).unwrap_err();
        assert!(matches!(error, ConfigError::YamlParse { .. }));
    }

    #[test]
    fn test_example_config_parses() {
        let yaml: YamlConfig = serde_yaml::from_str(OrchestraConfig::example_yaml_config()).unwrap();
        assert_eq!(yaml.id_generator.as_deref(), Some("ulid"));
    }

    #[test]
    fn test_generator_follows_kind() {
        let config = OrchestraConfig {
            id_generator: IdGeneratorKind::Uuid,
            ..OrchestraConfig::default()
        };
        let id = config.process_id_generator().generate();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }
}
