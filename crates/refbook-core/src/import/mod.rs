//! Fixture import for reference data.
//!
//! A fixture is a tree of directories, their versions and the versions'
//! elements, written as TOML, JSON or YAML:
//!
//! ```yaml
//! directories:
//!   - code: "1"
//!     name: Специальности
//!     versions:
//!       - version: "1.0"
//!         start_date: 2022-01-01
//!         elements:
//!           - code: E01
//!             value: Хирург
//! ```
//!
//! Each directory is written in its own transaction, so one bad directory does
//! not prevent the rest of the fixture from loading.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RefbookError, RefbookResult};
use crate::store::RefbookStore;
use crate::types::{NewDirectory, NewElement, NewVersion};

/// A whole fixture document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub directories: Vec<DirectoryFixture>,
}

/// A directory with its versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryFixture {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub versions: Vec<VersionFixture>,
}

/// A version with its elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFixture {
    pub version: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFixture {
    pub code: String,
    pub value: String,
}

impl DirectoryFixture {
    pub fn to_new_directory(&self) -> NewDirectory {
        NewDirectory {
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

impl VersionFixture {
    pub fn to_new_version(&self, directory_id: i64) -> NewVersion {
        NewVersion::new(directory_id, self.version.clone(), self.start_date)
    }
}

impl ElementFixture {
    pub fn to_new_element(&self, version_id: i64) -> NewElement {
        NewElement::new(version_id, self.code.clone(), self.value.clone())
    }
}

impl Fixture {
    /// Load a fixture from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> RefbookResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| RefbookError::parse(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| RefbookError::parse(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| RefbookError::parse(e.to_string()))
            }
            _ => Err(RefbookError::Configuration(
                "Unsupported fixture file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }
}

/// Statistics from an import operation.
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    /// Directories written.
    pub directories: u64,
    /// Versions written.
    pub versions: u64,
    /// Elements written.
    pub elements: u64,
    /// Directories skipped because their code already exists.
    pub skipped: u64,
    /// Error messages for directories that were rolled back.
    pub errors: Vec<String>,
}

impl ImportStats {
    /// Check if import completed without errors.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Write every directory of a fixture to the store.
///
/// Directories whose code is already present are left untouched. Storage
/// failures other than constraint violations abort the import.
pub fn import_fixture(store: &dyn RefbookStore, fixture: &Fixture) -> RefbookResult<ImportStats> {
    let mut stats = ImportStats::default();

    for directory in &fixture.directories {
        if store.find_directory_by_code(&directory.code)?.is_some() {
            warn!(code = %directory.code, "Directory already exists, skipping");
            stats.skipped += 1;
            continue;
        }

        match store.insert_directory_tree(directory) {
            Ok(_) => {
                stats.directories += 1;
                stats.versions += directory.versions.len() as u64;
                stats.elements += directory
                    .versions
                    .iter()
                    .map(|v| v.elements.len() as u64)
                    .sum::<u64>();
            }
            Err(err @ (RefbookError::Conflict { .. } | RefbookError::Validation { .. })) => {
                warn!(code = %directory.code, error = %err, "Directory rejected");
                stats
                    .errors
                    .push(format!("directory '{}': {}", directory.code, err));
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        directories = stats.directories,
        versions = stats.versions,
        elements = stats.elements,
        skipped = stats.skipped,
        errors = stats.errors.len(),
        "Fixture import finished"
    );
    Ok(stats)
}

/// Load a fixture file and import it.
pub fn import_file(store: &dyn RefbookStore, path: impl AsRef<Path>) -> RefbookResult<ImportStats> {
    let fixture = Fixture::from_file(path)?;
    import_fixture(store, &fixture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteRefbookStore;
    use std::io::Write;

    const YAML_FIXTURE: &str = r#"
directories:
  - code: "1"
    name: Специальности
    description: Медицинские специальности
    versions:
      - version: "1.0"
        start_date: 2022-01-01
        elements:
          - code: E01
            value: Хирург
          - code: E02
            value: Терапевт
      - version: "2.0"
        start_date: 2023-01-01
        elements:
          - code: E01
            value: Хирург
  - code: "2"
    name: Пустой
"#;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_yaml_fixture_import() {
        let store = SqliteRefbookStore::in_memory().unwrap();
        let file = write_temp(".yaml", YAML_FIXTURE);

        let stats = import_file(&store, file.path()).unwrap();
        assert!(stats.is_success());
        assert_eq!(stats.directories, 2);
        assert_eq!(stats.versions, 2);
        assert_eq!(stats.elements, 3);

        let dir = store.find_directory_by_code("1").unwrap().unwrap();
        assert_eq!(dir.description.as_deref(), Some("Медицинские специальности"));
        let v = store.find_version(dir.id, "1.0").unwrap().unwrap();
        assert_eq!(store.list_elements(v.id).unwrap().len(), 2);
    }

    #[test]
    fn test_json_and_toml_fixtures() {
        let json = r#"{"directories": [{"code": "J", "name": "Json",
            "versions": [{"version": "1", "start_date": "2022-05-01",
            "elements": [{"code": "A", "value": "a"}]}]}]}"#;
        let toml = r#"
[[directories]]
code = "T"
name = "Toml"

[[directories.versions]]
version = "1"
start_date = "2022-05-01"

[[directories.versions.elements]]
code = "A"
value = "a"
"#;
        let store = SqliteRefbookStore::in_memory().unwrap();
        let json_file = write_temp(".json", json);
        let toml_file = write_temp(".toml", toml);

        assert_eq!(import_file(&store, json_file.path()).unwrap().elements, 1);
        assert_eq!(import_file(&store, toml_file.path()).unwrap().elements, 1);
        assert_eq!(store.list_directories().unwrap().len(), 2);
    }

    #[test]
    fn test_reimport_skips_existing_directories() {
        let store = SqliteRefbookStore::in_memory().unwrap();
        let fixture: Fixture = serde_yaml::from_str(YAML_FIXTURE).unwrap();

        import_fixture(&store, &fixture).unwrap();
        let stats = import_fixture(&store, &fixture).unwrap();
        assert_eq!(stats.directories, 0);
        assert_eq!(stats.skipped, 2);
        assert_eq!(store.list_directories().unwrap().len(), 2);
    }

    #[test]
    fn test_bad_directory_does_not_block_others() {
        let yaml = r#"
directories:
  - code: BAD
    name: Broken
    versions:
      - version: "1.0"
        start_date: 2022-01-01
      - version: "2.0"
        start_date: 2022-01-01
  - code: GOOD
    name: Fine
"#;
        let store = SqliteRefbookStore::in_memory().unwrap();
        let fixture: Fixture = serde_yaml::from_str(yaml).unwrap();

        let stats = import_fixture(&store, &fixture).unwrap();
        assert!(!stats.is_success());
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].contains("BAD"));
        assert_eq!(stats.directories, 1);
        assert!(store.find_directory_by_code("BAD").unwrap().is_none());
        assert!(store.find_directory_by_code("GOOD").unwrap().is_some());
    }

    #[test]
    fn test_malformed_fixture_is_parse_error() {
        let file = write_temp(".json", r#"{"directories": [{"code": "1"}"#);
        let err = Fixture::from_file(file.path()).unwrap_err();
        assert!(matches!(err, RefbookError::Parse { .. }));
        assert_eq!(err.code(), crate::error::ErrorCode::ParseFailed);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".csv", "code,name");
        let err = Fixture::from_file(file.path()).unwrap_err();
        assert!(matches!(err, RefbookError::Configuration(_)));
    }
}
