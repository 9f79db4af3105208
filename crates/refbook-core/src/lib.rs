//! refbook-core - Core library for refbook.
//!
//! This crate provides the types, storage, version resolution and read-only
//! queries behind the refbook reference-data service.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use refbook_core::{RefbookService, SqliteRefbookStore};
//!
//! let store = Arc::new(SqliteRefbookStore::in_memory()?);
//! refbook_core::import::import_file(store.as_ref(), "fixtures/specialties.yaml")?;
//!
//! let service = RefbookService::new(store);
//! let elements = service.list_elements(1, None)?;
//! let found = service.check_element(1, "E01", "Хирург", Some("1.0".to_string()))?;
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod resolver;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::RefbookConfig;
pub use error::{ErrorCode, RefbookError, RefbookResult};
pub use import::{import_file, import_fixture, Fixture, ImportStats};
pub use resolver::{resolve, Clock, FixedClock, SystemClock};
pub use service::RefbookService;
pub use store::{RefbookStore, SqliteRefbookStore};
pub use types::{
    Directory, DirectoryDetail, DirectorySummary, Element, ElementCheck, ElementView,
    NewDirectory, NewElement, NewVersion, Version, VersionSelector, VersionView,
};
