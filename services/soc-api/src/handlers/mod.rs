//! HTTP request handlers for the SOC API.

pub mod health;
pub mod soc_stock;
pub mod stats;
pub mod tiles;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use soc_common::SocError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionResponse {
    /// Stable machine-readable code, e.g. `OutOfBounds`.
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl ExceptionResponse {
    pub fn new(type_: impl Into<String>, status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    /// A malformed or missing request parameter.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("InvalidParameterValue", StatusCode::BAD_REQUEST, detail)
    }

    pub fn from_error(err: &SocError) -> Self {
        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(err.error_code(), status, err.to_string())
    }
}

impl IntoResponse for ExceptionResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let json = serde_json::to_string(&self).unwrap_or_default();
        (status, [(header::CONTENT_TYPE, "application/json")], json).into_response()
    }
}
