//! HTTP client for the refbook REST API.

use chrono::NaiveDate;
use refbook_core::error::{ErrorCode, RefbookError, RefbookResult};
use refbook_core::types::{
    DirectoryDetail, DirectorySummary, ElementCheck, ElementView, VersionView,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Client for a refbook server.
#[derive(Debug, Clone)]
pub struct RefbookClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DirectoriesResponse {
    refbooks: Vec<DirectorySummary>,
}

#[derive(Debug, Deserialize)]
struct ElementsResponse {
    elements: Vec<ElementView>,
}

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    versions: Vec<VersionView>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

/// Health information reported by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// What a request was about, used to rebuild typed not-found errors.
#[derive(Debug, Default)]
struct Lookup<'a> {
    directory_id: Option<i64>,
    label: Option<&'a str>,
    element: Option<(&'a str, &'a str)>,
}

impl RefbookClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from `REFBOOK_BASE_URL` (default `http://localhost:8080`).
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("REFBOOK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }

    /// The server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> RefbookResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");
        self.client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| RefbookError::network(format!("Request to {} failed: {}", url, e)))
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
        lookup: Lookup<'_>,
    ) -> RefbookResult<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response, lookup).await);
        }
        response
            .json()
            .await
            .map_err(|e| RefbookError::parse(format!("Failed to parse response: {}", e)))
    }

    async fn error_from(response: Response, lookup: Lookup<'_>) -> RefbookError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let (message, code) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.error, body.code),
            Err(_) => (text, None),
        };

        match (code.as_deref().and_then(ErrorCode::parse), lookup.directory_id) {
            (Some(ErrorCode::DirectoryNotFound), Some(directory_id)) => {
                RefbookError::DirectoryNotFound { directory_id }
            }
            (Some(ErrorCode::VersionNotFound), Some(directory_id)) => {
                RefbookError::VersionNotFound {
                    directory_id,
                    label: lookup.label.map(str::to_string),
                }
            }
            (Some(ErrorCode::ElementNotFound), _) => match lookup.element {
                Some((code, value)) => RefbookError::ElementNotFound {
                    code: code.to_string(),
                    value: value.to_string(),
                },
                None => RefbookError::Internal(format!("HTTP {}: {}", status, message)),
            },
            _ => RefbookError::from_http_status(status, code.as_deref(), &message),
        }
    }

    /// List directories, optionally only those with a version started by `date`.
    pub async fn list_directories(
        &self,
        date: Option<NaiveDate>,
    ) -> RefbookResult<Vec<DirectorySummary>> {
        let date = date.map(|d| d.format("%Y-%m-%d").to_string());
        let mut query = Vec::new();
        if let Some(ref date) = date {
            query.push(("date", date.as_str()));
        }

        let response = self.get("/refbooks/", &query).await?;
        let body: DirectoriesResponse = Self::decode(response, Lookup::default()).await?;
        Ok(body.refbooks)
    }

    /// Get a directory with its current version.
    pub async fn get_directory(&self, directory_id: i64) -> RefbookResult<DirectoryDetail> {
        let response = self.get(&format!("/refbooks/{}/", directory_id), &[]).await?;
        Self::decode(
            response,
            Lookup {
                directory_id: Some(directory_id),
                ..Lookup::default()
            },
        )
        .await
    }

    /// List all versions of a directory.
    pub async fn list_versions(&self, directory_id: i64) -> RefbookResult<Vec<VersionView>> {
        let response = self
            .get(&format!("/refbooks/{}/versions/", directory_id), &[])
            .await?;
        let body: VersionsResponse = Self::decode(
            response,
            Lookup {
                directory_id: Some(directory_id),
                ..Lookup::default()
            },
        )
        .await?;
        Ok(body.versions)
    }

    /// List the elements of the labelled version, or of the current one.
    pub async fn list_elements(
        &self,
        directory_id: i64,
        version: Option<&str>,
    ) -> RefbookResult<Vec<ElementView>> {
        let mut query = Vec::new();
        if let Some(version) = version {
            query.push(("version", version));
        }

        let response = self
            .get(&format!("/refbooks/{}/elements/", directory_id), &query)
            .await?;
        let body: ElementsResponse = Self::decode(
            response,
            Lookup {
                directory_id: Some(directory_id),
                label: version,
                element: None,
            },
        )
        .await?;
        Ok(body.elements)
    }

    /// Check whether `code`/`value` is an element of the labelled or current version.
    ///
    /// A missing element is `Ok(ElementCheck::NotFound)`; a missing directory
    /// or version is an error.
    pub async fn check_element(
        &self,
        directory_id: i64,
        code: &str,
        value: &str,
        version: Option<&str>,
    ) -> RefbookResult<ElementCheck> {
        let mut query = vec![("code", code), ("value", value)];
        if let Some(version) = version {
            query.push(("version", version));
        }

        let response = self
            .get(&format!("/refbooks/{}/check_element", directory_id), &query)
            .await?;
        if response.status().is_success() {
            return Ok(ElementCheck::Found);
        }

        let lookup = Lookup {
            directory_id: Some(directory_id),
            label: version,
            element: Some((code, value)),
        };
        match Self::error_from(response, lookup).await {
            RefbookError::ElementNotFound { .. } => Ok(ElementCheck::NotFound),
            err => Err(err),
        }
    }

    /// Server health.
    pub async fn health(&self) -> RefbookResult<HealthStatus> {
        let response = self.get("/health", &[]).await?;
        Self::decode(response, Lookup::default()).await
    }
}
