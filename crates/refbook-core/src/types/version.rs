//! Version types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::check_field;
use crate::error::RefbookResult;

/// Maximum length of a version label.
pub const VERSION_LABEL_MAX_LEN: usize = 50;

/// A dated snapshot of a directory's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Surrogate identifier.
    pub id: i64,
    /// Owning directory.
    pub directory_id: i64,
    /// Version label, unique within the directory.
    pub version: String,
    /// Date the version takes effect. Unique within the directory.
    pub start_date: Option<NaiveDate>,
}

/// A version that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVersion {
    pub directory_id: i64,
    pub version: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl NewVersion {
    pub fn new(
        directory_id: i64,
        version: impl Into<String>,
        start_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            directory_id,
            version: version.into(),
            start_date,
        }
    }

    pub fn validate(&self) -> RefbookResult<()> {
        check_field("version", &self.version, VERSION_LABEL_MAX_LEN)
    }
}

/// Public shape of a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionView {
    pub version: String,
    pub start_date: Option<NaiveDate>,
}

impl From<Version> for VersionView {
    fn from(version: Version) -> Self {
        Self {
            version: version.version,
            start_date: version.start_date,
        }
    }
}

/// Which version of a directory a query should read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// The version with exactly this label.
    Label(String),
    /// The latest version that started on or before this date.
    AsOf(NaiveDate),
    /// The latest version that has started as of today.
    Current,
}

impl VersionSelector {
    /// `Label` when a label is given, `Current` otherwise.
    pub fn from_label(label: Option<String>) -> Self {
        match label {
            Some(label) => Self::Label(label),
            None => Self::Current,
        }
    }

    /// The explicit label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Label(label) => Some(label),
            _ => None,
        }
    }
}
