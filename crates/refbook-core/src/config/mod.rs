//! Configuration system for refbook.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{RefbookError, RefbookResult};

/// Main refbook configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefbookConfig {
    /// Path to the SQLite database. `:memory:` keeps everything in memory.
    pub database_path: PathBuf,
    /// Fixture imported when the store is opened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

impl Default for RefbookConfig {
    fn default() -> Self {
        let refbook_dir = dirs::home_dir()
            .map(|h| h.join(".refbook"))
            .unwrap_or_else(|| PathBuf::from(".refbook"));

        Self {
            database_path: refbook_dir.join("refbook.db"),
            seed_file: None,
        }
    }
}

impl RefbookConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> RefbookResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| RefbookError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| RefbookError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| RefbookError::Configuration(e.to_string())),
            _ => Err(RefbookError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `REFBOOK_DATABASE_PATH` and `REFBOOK_SEED_FILE` on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("REFBOOK_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("REFBOOK_SEED_FILE") {
            if !path.is_empty() {
                self.seed_file = Some(PathBuf::from(path));
            }
        }
        self
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> RefbookConfigBuilder {
        RefbookConfigBuilder::default()
    }
}

/// Builder for RefbookConfig.
#[derive(Default)]
pub struct RefbookConfigBuilder {
    config: RefbookConfig,
}

impl RefbookConfigBuilder {
    /// Set the database path.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = path.into();
        self
    }

    /// Use an in-memory database.
    pub fn in_memory(self) -> Self {
        self.database_path(":memory:")
    }

    /// Set the seed fixture.
    pub fn seed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.seed_file = Some(path.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RefbookConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_points_at_refbook_dir() {
        let config = RefbookConfig::default();
        assert!(config.database_path.ends_with(".refbook/refbook.db"));
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_builder() {
        let config = RefbookConfig::builder()
            .in_memory()
            .seed_file("seed.yaml")
            .build();
        assert_eq!(config.database_path, PathBuf::from(":memory:"));
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.yaml")));
    }

    #[test]
    fn test_from_toml_file_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "database_path = \"/var/lib/refbook/data.db\"").unwrap();

        let config = RefbookConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/refbook/data.db"));
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "database_path: ':memory:'\nseed_file: fixtures/seed.json").unwrap();

        let config = RefbookConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from(":memory:"));
        assert_eq!(config.seed_file, Some(PathBuf::from("fixtures/seed.json")));
    }

    #[test]
    fn test_unsupported_format() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = RefbookConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, RefbookError::Configuration(_)));
    }
}
