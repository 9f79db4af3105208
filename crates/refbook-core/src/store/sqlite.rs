//! SQLite-backed reference-data store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::debug;

use super::RefbookStore;
use crate::config::RefbookConfig;
use crate::error::{RefbookError, RefbookResult};
use crate::import::DirectoryFixture;
use crate::types::{Directory, Element, NewDirectory, NewElement, NewVersion, Version};

const DATE_FORMAT: &str = "%Y-%m-%d";

const DIRECTORY_COLUMNS: &str = "id, code, name, description";
const VERSION_COLUMNS: &str = "id, directory_id, version, start_date";
const ELEMENT_COLUMNS: &str = "id, version_id, element_code, element_value";

/// SQLite-backed reference-data store.
pub struct SqliteRefbookStore {
    conn: Mutex<Connection>,
}

impl SqliteRefbookStore {
    /// Open (or create) a store at the given path. `:memory:` opens an
    /// in-memory database.
    pub fn new(path: impl AsRef<Path>) -> RefbookResult<Self> {
        let path = path.as_ref();
        let conn = if path.to_str() == Some(":memory:") {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        };
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> RefbookResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Open the store described by a configuration.
    pub fn from_config(config: &RefbookConfig) -> RefbookResult<Self> {
        Self::new(&config.database_path)
    }

    fn with_connection(conn: Connection) -> RefbookResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> RefbookResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RefbookError::Internal("store connection lock poisoned".to_string()))
    }

    fn init_schema(&self) -> RefbookResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS directories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                directory_id INTEGER NOT NULL
                    REFERENCES directories(id) ON DELETE CASCADE,
                version TEXT NOT NULL,
                start_date TEXT,
                UNIQUE(directory_id, version),
                UNIQUE(directory_id, start_date)
            );

            -- Current-version resolution
            CREATE INDEX IF NOT EXISTS idx_versions_directory_start
                ON versions(directory_id, start_date);

            CREATE TABLE IF NOT EXISTS elements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version_id INTEGER NOT NULL
                    REFERENCES versions(id) ON DELETE CASCADE,
                element_code TEXT NOT NULL,
                element_value TEXT NOT NULL,
                UNIQUE(version_id, element_code)
            );
        "#,
        )?;
        Ok(())
    }

    fn format_date(date: Option<NaiveDate>) -> Option<String> {
        date.map(|d| d.format(DATE_FORMAT).to_string())
    }

    fn parse_date(data: Option<String>) -> RefbookResult<Option<NaiveDate>> {
        match data {
            Some(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map(Some)
                .map_err(|e| RefbookError::parse(format!("invalid start_date '{}': {}", s, e))),
            None => Ok(None),
        }
    }

    fn row_to_directory(row: &rusqlite::Row<'_>) -> rusqlite::Result<Directory> {
        Ok(Directory {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
        })
    }

    fn row_to_version(row: &rusqlite::Row<'_>) -> RefbookResult<Version> {
        let start_date: Option<String> = row.get(3)?;
        Ok(Version {
            id: row.get(0)?,
            directory_id: row.get(1)?,
            version: row.get(2)?,
            start_date: Self::parse_date(start_date)?,
        })
    }

    fn row_to_element(row: &rusqlite::Row<'_>) -> rusqlite::Result<Element> {
        Ok(Element {
            id: row.get(0)?,
            version_id: row.get(1)?,
            code: row.get(2)?,
            value: row.get(3)?,
        })
    }

    fn insert_directory_in(
        conn: &Connection,
        directory: &NewDirectory,
    ) -> RefbookResult<Directory> {
        directory.validate()?;
        conn.execute(
            "INSERT INTO directories (code, name, description) VALUES (?1, ?2, ?3)",
            params![directory.code, directory.name, directory.description],
        )?;
        Ok(Directory {
            id: conn.last_insert_rowid(),
            code: directory.code.clone(),
            name: directory.name.clone(),
            description: directory.description.clone(),
        })
    }

    fn insert_version_in(conn: &Connection, version: &NewVersion) -> RefbookResult<Version> {
        version.validate()?;
        conn.execute(
            "INSERT INTO versions (directory_id, version, start_date) VALUES (?1, ?2, ?3)",
            params![
                version.directory_id,
                version.version,
                Self::format_date(version.start_date),
            ],
        )?;
        Ok(Version {
            id: conn.last_insert_rowid(),
            directory_id: version.directory_id,
            version: version.version.clone(),
            start_date: version.start_date,
        })
    }

    fn insert_element_in(conn: &Connection, element: &NewElement) -> RefbookResult<Element> {
        element.validate()?;
        conn.execute(
            r#"INSERT INTO elements (version_id, element_code, element_value)
               VALUES (?1, ?2, ?3)"#,
            params![element.version_id, element.code, element.value],
        )?;
        Ok(Element {
            id: conn.last_insert_rowid(),
            version_id: element.version_id,
            code: element.code.clone(),
            value: element.value.clone(),
        })
    }

    fn insert_tree_in(
        tx: &Transaction<'_>,
        fixture: &DirectoryFixture,
    ) -> RefbookResult<Directory> {
        let directory = Self::insert_directory_in(tx, &fixture.to_new_directory())?;
        for version_fixture in &fixture.versions {
            let version =
                Self::insert_version_in(tx, &version_fixture.to_new_version(directory.id))?;
            for element_fixture in &version_fixture.elements {
                Self::insert_element_in(tx, &element_fixture.to_new_element(version.id))?;
            }
        }
        Ok(directory)
    }
}

impl RefbookStore for SqliteRefbookStore {
    fn insert_directory(&self, directory: &NewDirectory) -> RefbookResult<Directory> {
        let conn = self.lock()?;
        Self::insert_directory_in(&conn, directory)
    }

    fn insert_version(&self, version: &NewVersion) -> RefbookResult<Version> {
        let conn = self.lock()?;
        Self::insert_version_in(&conn, version)
    }

    fn insert_element(&self, element: &NewElement) -> RefbookResult<Element> {
        let conn = self.lock()?;
        Self::insert_element_in(&conn, element)
    }

    fn insert_directory_tree(&self, fixture: &DirectoryFixture) -> RefbookResult<Directory> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        // Dropping an uncommitted transaction rolls it back.
        let directory = Self::insert_tree_in(&tx, fixture)?;
        tx.commit()?;
        debug!(
            directory_id = directory.id,
            code = %directory.code,
            versions = fixture.versions.len(),
            "Inserted directory tree"
        );
        Ok(directory)
    }

    fn get_directory(&self, directory_id: i64) -> RefbookResult<Option<Directory>> {
        let conn = self.lock()?;
        let directory = conn
            .query_row(
                &format!("SELECT {} FROM directories WHERE id = ?1", DIRECTORY_COLUMNS),
                params![directory_id],
                Self::row_to_directory,
            )
            .optional()?;
        Ok(directory)
    }

    fn find_directory_by_code(&self, code: &str) -> RefbookResult<Option<Directory>> {
        let conn = self.lock()?;
        let directory = conn
            .query_row(
                &format!("SELECT {} FROM directories WHERE code = ?1", DIRECTORY_COLUMNS),
                params![code],
                Self::row_to_directory,
            )
            .optional()?;
        Ok(directory)
    }

    fn list_directories(&self) -> RefbookResult<Vec<Directory>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM directories ORDER BY id ASC",
            DIRECTORY_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_directory)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn list_directories_started_by(&self, date: NaiveDate) -> RefbookResult<Vec<Directory>> {
        let conn = self.lock()?;
        // EXISTS keeps a directory with several qualifying versions to one row.
        let mut stmt = conn.prepare(&format!(
            r#"SELECT {} FROM directories d
               WHERE EXISTS (
                   SELECT 1 FROM versions v
                   WHERE v.directory_id = d.id
                     AND v.start_date IS NOT NULL
                     AND v.start_date <= ?1
               )
               ORDER BY d.id ASC"#,
            DIRECTORY_COLUMNS
        ))?;
        let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
            Self::row_to_directory(row)
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn find_version(&self, directory_id: i64, label: &str) -> RefbookResult<Option<Version>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM versions WHERE directory_id = ?1 AND version = ?2",
            VERSION_COLUMNS
        ))?;

        stmt.query_row(params![directory_id, label], |row| {
            Ok(Self::row_to_version(row))
        })
        .optional()?
        .transpose()
    }

    fn latest_version_started_by(
        &self,
        directory_id: i64,
        date: NaiveDate,
    ) -> RefbookResult<Option<Version>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            r#"SELECT {} FROM versions
               WHERE directory_id = ?1
                 AND start_date IS NOT NULL
                 AND start_date <= ?2
               ORDER BY start_date DESC, id DESC
               LIMIT 1"#,
            VERSION_COLUMNS
        ))?;

        stmt.query_row(
            params![directory_id, date.format(DATE_FORMAT).to_string()],
            |row| Ok(Self::row_to_version(row)),
        )
        .optional()?
        .transpose()
    }

    fn list_versions(&self, directory_id: i64) -> RefbookResult<Vec<Version>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM versions WHERE directory_id = ?1 ORDER BY version ASC, id ASC",
            VERSION_COLUMNS
        ))?;

        let results = stmt.query_map(params![directory_id], |row| Ok(Self::row_to_version(row)))?;

        let versions = results
            .map(|r| r.map_err(RefbookError::from).and_then(|inner| inner))
            .collect();
        versions
    }

    fn list_elements(&self, version_id: i64) -> RefbookResult<Vec<Element>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM elements WHERE version_id = ?1 ORDER BY element_code ASC",
            ELEMENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![version_id], Self::row_to_element)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn find_element(
        &self,
        version_id: i64,
        code: &str,
        value: &str,
    ) -> RefbookResult<Option<Element>> {
        let conn = self.lock()?;
        let element = conn
            .query_row(
                &format!(
                    r#"SELECT {} FROM elements
                       WHERE version_id = ?1 AND element_code = ?2 AND element_value = ?3"#,
                    ELEMENT_COLUMNS
                ),
                params![version_id, code, value],
                Self::row_to_element,
            )
            .optional()?;
        Ok(element)
    }
}
