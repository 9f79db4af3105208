//! Health check and landing page.

use axum::{response::Html, Json};
use serde::Serialize;

use crate::error::ApiResult;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check() -> ApiResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html("<h1>Сервис терминологий</h1>")
}
