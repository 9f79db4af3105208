//! refbook-client - Client library for the refbook REST API.
//!
//! # Example
//!
//! ```ignore
//! use refbook_client::RefbookClient;
//!
//! let client = RefbookClient::new("http://localhost:8080");
//!
//! let refbooks = client.list_directories(None).await?;
//! let elements = client.list_elements(1, Some("1.0")).await?;
//! let check = client.check_element(1, "E01", "Хирург", None).await?;
//! ```

mod client;

pub use client::{HealthStatus, RefbookClient};
pub use refbook_core::types::{
    DirectoryDetail, DirectorySummary, ElementCheck, ElementView, VersionView,
};
