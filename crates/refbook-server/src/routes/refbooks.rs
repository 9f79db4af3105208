//! Directory, version and element endpoints.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use refbook_core::error::RefbookError;
use refbook_core::types::{
    DirectoryDetail, DirectorySummary, ElementCheck, ElementView, VersionView,
};

/// Message returned when an element is present in the version.
pub const ELEMENT_FOUND_MESSAGE: &str = "Элемент найден";

/// Empty query values mean "not given".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::bad_request(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
    })
}

/// Query parameters for listing directories.
#[derive(Debug, Deserialize)]
pub struct DirectoriesQuery {
    /// Only directories with a version started on or before this date.
    pub date: Option<String>,
}

/// Response for listing directories.
#[derive(Debug, Serialize, Deserialize)]
pub struct DirectoriesResponse {
    pub refbooks: Vec<DirectorySummary>,
}

/// List directories.
/// GET /refbooks/?date=YYYY-MM-DD
pub async fn list_directories(
    State(state): State<AppState>,
    query: Result<Query<DirectoriesQuery>, QueryRejection>,
) -> ApiResult<Json<DirectoriesResponse>> {
    let Query(query) = query?;
    let as_of = non_empty(query.date).as_deref().map(parse_date).transpose()?;

    let refbooks = state.run(move |svc| svc.list_directories(as_of)).await?;
    Ok(Json(DirectoriesResponse { refbooks }))
}

/// Get a directory with its current version.
/// GET /refbooks/:id/
pub async fn get_directory(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<DirectoryDetail>> {
    let Path(directory_id) = path?;
    let detail = state.run(move |svc| svc.get_directory(directory_id)).await?;
    Ok(Json(detail))
}

/// Response for listing versions.
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionsResponse {
    pub versions: Vec<VersionView>,
}

/// List all versions of a directory.
/// GET /refbooks/:id/versions/
pub async fn list_versions(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<VersionsResponse>> {
    let Path(directory_id) = path?;
    let versions = state.run(move |svc| svc.list_versions(directory_id)).await?;
    Ok(Json(VersionsResponse { versions }))
}

/// Query parameters for listing elements.
#[derive(Debug, Deserialize)]
pub struct ElementsQuery {
    /// Version label. The current version is used when absent.
    pub version: Option<String>,
}

/// Response for listing elements.
#[derive(Debug, Serialize, Deserialize)]
pub struct ElementsResponse {
    pub elements: Vec<ElementView>,
}

/// List the elements of a directory version.
/// GET /refbooks/:id/elements/?version=<label>
pub async fn list_elements(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<ElementsQuery>, QueryRejection>,
) -> ApiResult<Json<ElementsResponse>> {
    let Path(directory_id) = path?;
    let Query(query) = query?;
    let version = non_empty(query.version);

    let elements = state
        .run(move |svc| svc.list_elements(directory_id, version))
        .await?;
    Ok(Json(ElementsResponse { elements }))
}

/// Query parameters for checking an element.
#[derive(Debug, Deserialize)]
pub struct CheckElementQuery {
    pub code: Option<String>,
    pub value: Option<String>,
    pub version: Option<String>,
}

/// Response for a successful element check.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckElementResponse {
    pub message: String,
}

/// Check that a code/value pair exists in a directory version.
/// GET /refbooks/:id/check_element?code=<c>&value=<v>&version=<label>
pub async fn check_element(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<CheckElementQuery>, QueryRejection>,
) -> ApiResult<Json<CheckElementResponse>> {
    let Path(directory_id) = path?;
    let Query(query) = query?;

    let (code, value) = match (query.code, query.value) {
        (Some(code), Some(value)) => (code, value),
        _ => {
            return Err(ApiError::bad_request(
                "Query parameters 'code' and 'value' are required",
            ))
        }
    };
    let version = non_empty(query.version);

    let lookup = (code.clone(), value.clone());
    let check = state
        .run(move |svc| svc.check_element(directory_id, &lookup.0, &lookup.1, version))
        .await?;

    match check {
        ElementCheck::Found => Ok(Json(CheckElementResponse {
            message: ELEMENT_FOUND_MESSAGE.to_string(),
        })),
        ElementCheck::NotFound => Err(RefbookError::ElementNotFound { code, value }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("1.0".into())), Some("1.0".to_string()));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2022-10-01").unwrap(),
            NaiveDate::from_ymd_opt(2022, 10, 1).unwrap()
        );
        assert!(parse_date("01.10.2022").is_err());
        assert!(parse_date("2022-13-01").is_err());
    }
}
