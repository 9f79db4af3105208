//! Route definitions for the REST API.

mod health;
mod refbooks;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index))
        // Health check
        .route("/health", get(health::health_check))
        // Directories
        .route("/refbooks", get(refbooks::list_directories))
        .route("/refbooks/", get(refbooks::list_directories))
        .route("/refbooks/:id", get(refbooks::get_directory))
        .route("/refbooks/:id/", get(refbooks::get_directory))
        // Versions and elements
        .route("/refbooks/:id/versions", get(refbooks::list_versions))
        .route("/refbooks/:id/versions/", get(refbooks::list_versions))
        .route("/refbooks/:id/elements", get(refbooks::list_elements))
        .route("/refbooks/:id/elements/", get(refbooks::list_elements))
        .route("/refbooks/:id/check_element", get(refbooks::check_element))
        .route("/refbooks/:id/check_element/", get(refbooks::check_element))
        // Attach state
        .with_state(state)
}

pub use health::*;
pub use refbooks::*;
