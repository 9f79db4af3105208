//! Storage layer for directories, versions and elements.

mod sqlite;

pub use sqlite::SqliteRefbookStore;

use chrono::NaiveDate;

use crate::error::RefbookResult;
use crate::import::DirectoryFixture;
use crate::types::{Directory, Element, NewDirectory, NewElement, NewVersion, Version};

/// Trait for reference-data storage.
///
/// Read methods return `Ok(None)` or an empty `Vec` for missing records; only
/// storage failures are errors. Write methods enforce the uniqueness
/// invariants and fail with `RefbookError::Conflict` when one is violated.
pub trait RefbookStore: Send + Sync {
    /// Store a new directory.
    fn insert_directory(&self, directory: &NewDirectory) -> RefbookResult<Directory>;

    /// Store a new version.
    fn insert_version(&self, version: &NewVersion) -> RefbookResult<Version>;

    /// Store a new element.
    fn insert_element(&self, element: &NewElement) -> RefbookResult<Element>;

    /// Store a directory with all of its versions and elements atomically.
    fn insert_directory_tree(&self, fixture: &DirectoryFixture) -> RefbookResult<Directory>;

    /// Get a directory by id.
    fn get_directory(&self, directory_id: i64) -> RefbookResult<Option<Directory>>;

    /// Get a directory by its unique code.
    fn find_directory_by_code(&self, code: &str) -> RefbookResult<Option<Directory>>;

    /// All directories, ordered by id.
    fn list_directories(&self) -> RefbookResult<Vec<Directory>>;

    /// Directories owning at least one version with `start_date <= date`,
    /// each exactly once, ordered by id.
    fn list_directories_started_by(&self, date: NaiveDate) -> RefbookResult<Vec<Directory>>;

    /// The version of a directory with exactly this label.
    fn find_version(&self, directory_id: i64, label: &str) -> RefbookResult<Option<Version>>;

    /// The version of a directory with the greatest `start_date <= date`.
    fn latest_version_started_by(
        &self,
        directory_id: i64,
        date: NaiveDate,
    ) -> RefbookResult<Option<Version>>;

    /// All versions of a directory, ordered by label.
    fn list_versions(&self, directory_id: i64) -> RefbookResult<Vec<Version>>;

    /// All elements of a version, ordered by code.
    fn list_elements(&self, version_id: i64) -> RefbookResult<Vec<Element>>;

    /// The element of a version matching both code and value exactly.
    fn find_element(
        &self,
        version_id: i64,
        code: &str,
        value: &str,
    ) -> RefbookResult<Option<Element>>;
}
