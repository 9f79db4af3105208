//! Directory types.

use serde::{Deserialize, Serialize};

use super::{check_field, VersionView};
use crate::error::RefbookResult;

/// Maximum length of a directory code.
pub const DIRECTORY_CODE_MAX_LEN: usize = 100;
/// Maximum length of a directory name.
pub const DIRECTORY_NAME_MAX_LEN: usize = 300;

/// A stored directory (a named, coded reference list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Surrogate identifier.
    pub id: i64,
    /// Unique directory code.
    pub code: String,
    /// Human readable name.
    pub name: String,
    /// Optional free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A directory that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDirectory {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewDirectory {
    /// Create a new directory without a description.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> RefbookResult<()> {
        check_field("directory code", &self.code, DIRECTORY_CODE_MAX_LEN)?;
        check_field("directory name", &self.name, DIRECTORY_NAME_MAX_LEN)
    }
}

/// Directory as listed by `GET /refbooks/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySummary {
    pub id: i64,
    pub code: String,
    pub name: String,
}

impl From<Directory> for DirectorySummary {
    fn from(directory: Directory) -> Self {
        Self {
            id: directory.id,
            code: directory.code,
            name: directory.name,
        }
    }
}

/// Directory together with its current version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryDetail {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// `None` when no version has started yet.
    pub current_version: Option<VersionView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_directory_validation() {
        assert!(NewDirectory::new("1", "Специальности").validate().is_ok());
        assert!(NewDirectory::new("  ", "Специальности").validate().is_err());
        assert!(NewDirectory::new("1", "").validate().is_err());

        let long_code = "к".repeat(DIRECTORY_CODE_MAX_LEN + 1);
        assert!(NewDirectory::new(long_code, "name").validate().is_err());

        // Limits count characters, not bytes.
        let max_code = "к".repeat(DIRECTORY_CODE_MAX_LEN);
        assert!(NewDirectory::new(max_code, "name").validate().is_ok());
    }

    #[test]
    fn test_summary_drops_description() {
        let directory = Directory {
            id: 3,
            code: "SPEC".to_string(),
            name: "Специальности".to_string(),
            description: Some("Медицинские специальности".to_string()),
        };
        let summary = DirectorySummary::from(directory);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "code": "SPEC", "name": "Специальности"})
        );
    }
}
