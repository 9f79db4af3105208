//! Server state management.

use std::sync::Arc;

use refbook_core::error::RefbookResult;
use refbook_core::import::import_file;
use refbook_core::{RefbookConfig, RefbookService, SqliteRefbookStore};
use tracing::info;

use crate::error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: RefbookService,
}

impl AppState {
    /// Create with a pre-built service.
    pub fn new(service: RefbookService) -> Self {
        Self { service }
    }

    /// Open the configured store, import the seed fixture if any, and wrap it
    /// in a service.
    pub fn from_config(config: &RefbookConfig) -> RefbookResult<Self> {
        let store = Arc::new(SqliteRefbookStore::from_config(config)?);
        info!(path = %config.database_path.display(), "Opened refbook store");

        if let Some(ref seed) = config.seed_file {
            let stats = import_file(store.as_ref(), seed)?;
            info!(
                seed = %seed.display(),
                directories = stats.directories,
                skipped = stats.skipped,
                "Seed fixture imported"
            );
        }

        Ok(Self::new(RefbookService::new(store)))
    }

    /// Run a service call on the blocking pool; store access is synchronous.
    pub async fn run<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&RefbookService) -> RefbookResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| ApiError::internal(format!("Task join error: {}", e)))?
            .map_err(ApiError::from)
    }
}
