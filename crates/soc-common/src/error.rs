//! Error taxonomy for tile loading and point queries.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using SocError.
pub type SocResult<T> = Result<T, SocError>;

/// Why a resolved coordinate produced no measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataReason {
    /// The 1x1 read window fell outside the pixel grid.
    EmptyWindow,
    /// The pixel holds the tile's nodata sentinel.
    NodataValue,
    /// The pixel is NaN.
    NotANumber,
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoDataReason::EmptyWindow => "no pixel returned for the coordinates",
            NoDataReason::NodataValue => "pixel holds the nodata value",
            NoDataReason::NotANumber => "pixel is NaN",
        };
        f.write_str(text)
    }
}

/// Primary error type for the SOC service.
#[derive(Debug, Error)]
pub enum SocError {
    // === Startup Errors ===
    #[error("No datasets have been loaded from {0}")]
    NoDatasets(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to open raster: {0}")]
    Raster(String),

    #[error("Projection error: {0}")]
    Projection(String),

    // === Query Errors ===
    #[error("Coordinates are invalid: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Coordinates are out of bounds for all datasets: lat={lat}, lon={lon}")]
    OutOfBounds { lat: f64, lon: f64 },

    #[error("No data available for the specified coordinates: {reason}")]
    NoData { reason: NoDataReason },

    #[error("Cannot aggregate statistics: {0}")]
    Aggregation(String),
}

impl SocError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            SocError::NoDatasets(_) | SocError::Config(_) => "ConfigError",
            SocError::Raster(_) => "RasterError",
            SocError::Projection(_) => "ProjectionError",
            SocError::InvalidCoordinate { .. } => "InvalidCoordinate",
            SocError::OutOfBounds { .. } => "OutOfBounds",
            SocError::NoData { .. } => "NoData",
            SocError::Aggregation(_) => "AggregationError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            SocError::InvalidCoordinate { .. } | SocError::OutOfBounds { .. } => 400,

            SocError::NoData { .. } => 404,

            SocError::NoDatasets(_)
            | SocError::Config(_)
            | SocError::Raster(_)
            | SocError::Projection(_)
            | SocError::Aggregation(_) => 500,
        }
    }

    /// Whether the failure was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }
}

impl From<std::io::Error> for SocError {
    fn from(err: std::io::Error) -> Self {
        SocError::Raster(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_distinct_client_failures() {
        let invalid = SocError::InvalidCoordinate { lat: 91.0, lon: 0.0 };
        let out = SocError::OutOfBounds { lat: 1.0, lon: 1.0 };
        let nodata = SocError::NoData {
            reason: NoDataReason::NodataValue,
        };

        assert_eq!(invalid.http_status_code(), 400);
        assert_eq!(out.http_status_code(), 400);
        assert_eq!(nodata.http_status_code(), 404);
        assert_ne!(invalid.error_code(), out.error_code());
        assert!(invalid.is_client_error());
        assert!(nodata.is_client_error());
    }

    #[test]
    fn test_startup_errors_are_server_failures() {
        let err = SocError::NoDatasets("geodata".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "ConfigError");
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "No datasets have been loaded from geodata");
    }

    #[test]
    fn test_nodata_message_includes_reason() {
        let err = SocError::NoData {
            reason: NoDataReason::EmptyWindow,
        };
        assert!(err.to_string().contains("no pixel returned"));
    }
}
